//! Math language conversion
//!
//! Markdown can only carry TeX, so math in any other language is converted on the way out. The
//! converter is injected through [`crate::EncodeOptions`]; [`DefaultMathConverter`] handles the
//! common MathML subset found in JATS and passes anything else through unchanged with a warning.

use crate::error::CodecError;
use roxmltree::{Document, Node as XmlNode};

pub trait MathConverter: Send + Sync {
    /// Convert `text` from math language `from` to math language `to`
    fn convert(&self, text: &str, from: &str, to: &str) -> Result<String, CodecError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMathConverter;

impl MathConverter for DefaultMathConverter {
    fn convert(&self, text: &str, from: &str, to: &str) -> Result<String, CodecError> {
        let from = from.to_lowercase();
        let to = to.to_lowercase();
        if from == to || (is_tex(&from) && is_tex(&to)) {
            return Ok(text.to_string());
        }
        if from == "mathml" && is_tex(&to) {
            return mathml_to_tex(text);
        }
        tracing::warn!(
            target: "docweave::decode",
            from = from.as_str(),
            to = to.as_str(),
            "no math conversion available, passing through unchanged"
        );
        Ok(text.to_string())
    }
}

fn is_tex(language: &str) -> bool {
    language == "tex" || language == "latex"
}

/// Convert presentation MathML to TeX
///
/// A TeX annotation inside `<semantics>` is used verbatim when present.
pub fn mathml_to_tex(mathml: &str) -> Result<String, CodecError> {
    let doc = Document::parse(mathml).map_err(|err| CodecError::malformed("mathml", err))?;
    Ok(element_tex(doc.root_element()).trim().to_string())
}

fn children_tex(node: XmlNode) -> String {
    node.children()
        .filter(XmlNode::is_element)
        .map(element_tex)
        .collect()
}

fn nth_child_tex(node: XmlNode, index: usize) -> String {
    node.children()
        .filter(XmlNode::is_element)
        .nth(index)
        .map(element_tex)
        .unwrap_or_default()
}

/// Wrap in braces unless the group is a single character
fn group(tex: String) -> String {
    if tex.chars().count() == 1 {
        tex
    } else {
        format!("{{{tex}}}")
    }
}

fn element_tex(node: XmlNode) -> String {
    let text = || node.text().unwrap_or_default().trim().to_string();
    match node.tag_name().name() {
        "math" | "mrow" | "mstyle" | "mpadded" | "mphantom" => children_tex(node),
        "semantics" => {
            let tex_annotation = node.children().find(|child| {
                child.tag_name().name() == "annotation"
                    && matches!(child.attribute("encoding"), Some("application/x-tex" | "TeX"))
            });
            match tex_annotation {
                Some(annotation) => annotation.text().unwrap_or_default().trim().to_string(),
                None => nth_child_tex(node, 0),
            }
        }
        "mi" | "mn" => {
            let text = text();
            match text.as_str() {
                "π" => r"\pi ".to_string(),
                "α" => r"\alpha ".to_string(),
                "β" => r"\beta ".to_string(),
                "γ" => r"\gamma ".to_string(),
                "θ" => r"\theta ".to_string(),
                "∞" => r"\infty ".to_string(),
                _ => text,
            }
        }
        "mo" => {
            let text = text();
            match text.as_str() {
                "×" => r"\times ".to_string(),
                "·" | "⋅" => r"\cdot ".to_string(),
                "±" => r"\pm ".to_string(),
                "≤" => r"\leq ".to_string(),
                "≥" => r"\geq ".to_string(),
                "≠" => r"\neq ".to_string(),
                "→" => r"\to ".to_string(),
                "∑" => r"\sum ".to_string(),
                "∫" => r"\int ".to_string(),
                "{" => r"\{".to_string(),
                "}" => r"\}".to_string(),
                "\u{2061}" | "\u{2062}" => String::new(),
                _ => text,
            }
        }
        "mtext" => format!(r"\text{{{}}}", text()),
        "mspace" => r"\ ".to_string(),
        "msup" => format!(
            "{}^{}",
            nth_child_tex(node, 0),
            group(nth_child_tex(node, 1))
        ),
        "msub" => format!(
            "{}_{}",
            nth_child_tex(node, 0),
            group(nth_child_tex(node, 1))
        ),
        "msubsup" => format!(
            "{}_{}^{}",
            nth_child_tex(node, 0),
            group(nth_child_tex(node, 1)),
            group(nth_child_tex(node, 2))
        ),
        "mfrac" => format!(
            r"\frac{{{}}}{{{}}}",
            nth_child_tex(node, 0),
            nth_child_tex(node, 1)
        ),
        "msqrt" => format!(r"\sqrt{{{}}}", children_tex(node)),
        "mroot" => format!(
            r"\sqrt[{}]{{{}}}",
            nth_child_tex(node, 1),
            nth_child_tex(node, 0)
        ),
        "mfenced" => {
            let open = node.attribute("open").unwrap_or("(");
            let close = node.attribute("close").unwrap_or(")");
            format!(r"\left{open}{}\right{close}", children_tex(node))
        }
        "annotation" | "annotation-xml" => String::new(),
        other => {
            tracing::warn!(
                target: "docweave::decode",
                element = other,
                "unsupported MathML element, using its children"
            );
            children_tex(node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MATHML: &str = r#"<math xmlns="http://www.w3.org/1998/Math/MathML">
        <mrow><msup><mi>x</mi><mn>2</mn></msup><mo>+</mo><mfrac><mn>1</mn><mi>y</mi></mfrac></mrow>
    </math>"#;

    #[test]
    fn converts_basic_mathml() {
        assert_eq!(mathml_to_tex(MATHML).unwrap(), r"x^2+\frac{1}{y}");
    }

    #[test]
    fn prefers_tex_annotation() {
        let mathml = r#"<math><semantics><mi>a</mi>
            <annotation encoding="application/x-tex">\alpha</annotation></semantics></math>"#;
        assert_eq!(mathml_to_tex(mathml).unwrap(), r"\alpha");
    }

    #[test]
    fn tex_passes_through() {
        let converted = DefaultMathConverter.convert("E=mc^2", "latex", "tex").unwrap();
        assert_eq!(converted, "E=mc^2");
    }

    #[test]
    fn unknown_languages_pass_through() {
        let converted = DefaultMathConverter
            .convert("x^2", "asciimath", "tex")
            .unwrap();
        assert_eq!(converted, "x^2");
    }

    #[test]
    fn malformed_mathml_is_an_error() {
        assert!(mathml_to_tex("<math><mi>x</math>").is_err());
    }
}
