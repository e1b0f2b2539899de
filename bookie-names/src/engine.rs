//! Tera rendering of name templates.
//!
//! A pattern such as `Handy Cap - {HC}` is split into literal text and
//! `{placeholder}` segments, then compiled into a tera template in which the
//! only expressions are the placeholders. Literal text that contains braces is
//! bound as a variable instead of being inlined, so nothing but the
//! placeholders is ever interpreted.
//!
//! | Pattern                          | Attributes                        | Result            |
//! |----------------------------------|-----------------------------------|-------------------|
//! | `{teams.home} vs {teams.away}`   | `teams: {home: Lions, away: Bears}` | `Lions vs Bears` |
//! | `Handy Cap - {HC}` (`HC → handy_cap`) | `handy_cap: 3.5`             | `Handy Cap - 3.5` |
//! | `Over/Under {{x}}`               | `x: 2`                            | `Over/Under {2}`  |

use tera::{Context, Tera};

use bookie_core::{AttributeBag, NameSet, NameTemplate};

use crate::context::ParameterBinding;
use crate::error::ResolveError;

// ---------------------------------------------------------------------------
// Pattern segments
// ---------------------------------------------------------------------------

/// A piece of a name pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// Split `pattern` into literal and placeholder segments.
///
/// A placeholder is `{name}` where `name` is a dotted path of identifiers
/// (`HC`, `teams.home`). Any other brace is literal text.
pub fn segments(pattern: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;
    while let Some(open) = pattern[cursor..].find('{').map(|i| cursor + i) {
        let Some(close) = pattern[open + 1..].find('}').map(|i| open + 1 + i) else {
            break;
        };
        let name = &pattern[open + 1..close];
        if is_placeholder_name(name) {
            if literal_start < open {
                out.push(Segment::Literal(&pattern[literal_start..open]));
            }
            out.push(Segment::Placeholder(name));
            cursor = close + 1;
            literal_start = cursor;
        } else {
            cursor = open + 1;
        }
    }
    if literal_start < pattern.len() {
        out.push(Segment::Literal(&pattern[literal_start..]));
    }
    out
}

/// Placeholder names referenced by `pattern`, in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<&str> {
    segments(pattern)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// Tera source plus the context that renders it.
struct CompiledPattern {
    source: String,
    context: Context,
}

fn compile(pattern: &str, binding: &ParameterBinding) -> CompiledPattern {
    let mut source = String::with_capacity(pattern.len() + 16);
    let mut context = Context::new();
    for (index, segment) in segments(pattern).into_iter().enumerate() {
        match segment {
            Segment::Literal(text) if !text.contains(|c: char| c == '{' || c == '}') => {
                source.push_str(text)
            }
            Segment::Literal(text) => {
                let var = format!("literal_{index}");
                source.push_str(&format!("{{{{ {var} }}}}"));
                context.insert(var, text);
            }
            Segment::Placeholder(name) => {
                let var = format!("param_{index}");
                source.push_str(&format!("{{{{ {var} }}}}"));
                // Bound by construction: the binding covers every placeholder.
                context.insert(var, binding.get(name).unwrap_or_default());
            }
        }
    }
    CompiledPattern { source, context }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve `template` against `attributes` into a finished name set.
///
/// Every language of the template yields one text with no placeholder left.
/// Fails with `TemplateParameterMissing` before rendering anything if a
/// referenced parameter is absent. Pure: the same inputs give the same names.
pub fn resolve(template: &NameTemplate, attributes: &AttributeBag) -> Result<NameSet, ResolveError> {
    let binding = ParameterBinding::bind(template, attributes)?;

    // One registered template per language, named by the language code.
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    let mut contexts = Vec::with_capacity(template.patterns.len());
    for (language, pattern) in &template.patterns {
        let compiled = compile(pattern, &binding);
        tera.add_raw_template(language, &compiled.source)
            .map_err(engine_error(language))?;
        contexts.push((language, compiled.context));
    }

    let mut names = NameSet::new();
    for (language, context) in contexts {
        let text = tera
            .render(language, &context)
            .map_err(engine_error(language))?;
        names.insert(language.clone(), text);
    }
    Ok(names)
}

fn engine_error(language: &str) -> impl FnOnce(tera::Error) -> ResolveError + '_ {
    move |source| ResolveError::Engine {
        language: language.to_owned(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn segments_split_literals_and_placeholders() {
        assert_eq!(
            segments("{teams.home} vs {teams.away}"),
            vec![
                Segment::Placeholder("teams.home"),
                Segment::Literal(" vs "),
                Segment::Placeholder("teams.away"),
            ]
        );
    }

    #[rstest]
    #[case("no braces", &[])]
    #[case("{}", &[])]
    #[case("{1abc}", &[])]
    #[case("{a..b}", &[])]
    #[case("{ HC }", &[])]
    #[case("open { only", &[])]
    #[case("{{x}}", &["x"])]
    #[case("{a}{b}", &["a", "b"])]
    fn placeholder_detection(#[case] pattern: &str, #[case] expected: &[&str]) {
        assert_eq!(placeholders(pattern), expected);
    }

    #[test]
    fn literal_braces_survive_rendering() {
        let template = NameTemplate::default().with_pattern("en", "{{x}} {% raw %} {#c#}");
        let attributes = AttributeBag::new().with("x", 2);
        let names = resolve(&template, &attributes).expect("resolve");
        assert_eq!(names.get("en"), Some("{2} {% raw %} {#c#}"));
    }

    #[test]
    fn every_language_is_resolved() {
        let template = NameTemplate::default()
            .with_pattern("en", "{teams.home} vs {teams.away}")
            .with_pattern("de", "{teams.home} gegen {teams.away}");
        let attributes = AttributeBag::new()
            .with("teams", serde_json::json!({"home": "Lions", "away": "Bears"}));
        let names = resolve(&template, &attributes).expect("resolve");
        assert_eq!(names.get("en"), Some("Lions vs Bears"));
        assert_eq!(names.get("de"), Some("Lions gegen Bears"));
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn html_like_text_is_not_escaped() {
        let template = NameTemplate::default().with_pattern("en", "{a} & <b>");
        let attributes = AttributeBag::new().with("a", "R&D");
        let names = resolve(&template, &attributes).unwrap();
        assert_eq!(names.get("en"), Some("R&D & <b>"));
    }
}
