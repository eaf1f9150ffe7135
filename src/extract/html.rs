//! Tolerant flattening of a scraped page into plain text.
//!
//! The source's markup is not guaranteed to be well-formed, so no HTML parser
//! is involved: tags are dropped wherever one can be recognised, script and
//! style bodies are skipped, comments are removed, entities are decoded, and
//! anything unrecognisable passes through as text. Adjacent text nodes are
//! glued together without a separator, which is exactly what the figure and
//! hourly patterns expect ("Hourly forecast09:004 w/m2").

use std::ops::Range;

/// Page text with the positions of its heading elements.
pub struct FlattenedPage {
    pub text: String,
    headings: Vec<Range<usize>>,
}

impl FlattenedPage {
    /// Text of the closest heading that falls entirely inside the window.
    #[must_use]
    pub fn heading_within(&self, window: &Range<usize>) -> Option<&str> {
        self.headings
            .iter()
            .rev()
            .find(|span| span.start >= window.start && span.end <= window.end)
            .map(|span| &self.text[span.clone()])
    }
}

/// Strips markup from `html`, recording `h1`–`h6` text spans along the way.
#[must_use]
pub fn flatten(html: &str) -> FlattenedPage {
    let mut text = String::with_capacity(html.len() / 2);
    let mut headings = Vec::new();
    let mut pending_heading: Option<usize> = None;

    let mut index = 0;
    while index < html.len() {
        let Some(offset) = html[index..].find('<') else {
            decode_entities_into(&html[index..], &mut text);
            break;
        };
        decode_entities_into(&html[index..index + offset], &mut text);
        index += offset;

        if html[index..].starts_with("<!--") {
            match html[index..].find("-->") {
                Some(end) => index += end + 3,
                None => break,
            }
            continue;
        }

        let Some(close) = html[index..].find('>') else {
            // A dangling `<` is text, not markup.
            decode_entities_into(&html[index..], &mut text);
            break;
        };
        let tag = html[index + 1..index + close].trim();
        index += close + 1;

        let is_closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_lowercase();

        if !is_closing && (name == "script" || name == "style") {
            // Skip the body up to the matching closing tag. An unterminated
            // block swallows the rest of the page.
            let closing = format!("</{name}");
            let Some(offset) = find_ignore_ascii_case(&html[index..], &closing) else {
                break;
            };
            index += offset;
            match html[index..].find('>') {
                Some(end) => index += end + 1,
                None => break,
            }
            continue;
        }

        if is_heading(&name) {
            if is_closing {
                if let Some(start) = pending_heading.take()
                    && start < text.len()
                {
                    headings.push(start..text.len());
                }
            } else {
                pending_heading = Some(text.len());
            }
        }
    }

    FlattenedPage { text, headings }
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.as_bytes();
    let needle = needle.as_bytes();
    haystack.windows(needle.len()).position(|window| window.eq_ignore_ascii_case(needle))
}

fn decode_entities_into(chunk: &str, out: &mut String) {
    let mut rest = chunk;
    while let Some(position) = rest.find('&') {
        out.push_str(&rest[..position]);
        rest = &rest[position..];
        match decode_entity(rest) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
}

/// Decodes one entity at the start of `rest`, returning the character and the
/// number of bytes consumed. Entities are short, so a distant `;` disqualifies.
fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let end = rest.find(';').filter(|end| *end <= 10)?;
    let body = &rest[1..end];
    let decoded = match body {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "deg" => '°',
        "sup2" => '²',
        _ => {
            let code = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(decimal) = body.strip_prefix('#') {
                decimal.parse().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_glues_text() {
        let page = flatten("<td>Total solar radiation:</td><td>579 wh/m2.</td>");
        assert_eq!(page.text, "Total solar radiation:579 wh/m2.");
    }

    #[test]
    fn decodes_entities() {
        let page = flatten("40 w/m&sup2; &amp; 5 &#176;C &lt;min&gt;");
        assert_eq!(page.text, "40 w/m² & 5 °C <min>");
    }

    #[test]
    fn unknown_entities_pass_through() {
        let page = flatten("fish &chips;&unknownentity;");
        assert_eq!(page.text, "fish &chips;&unknownentity;");
    }

    #[test]
    fn skips_script_and_style_bodies() {
        let page = flatten(
            "<p>before</p><script>var x = '<b>09:00</b>';</script><style>td { color: red }</style>after",
        );
        assert_eq!(page.text, "beforeafter");
    }

    #[test]
    fn drops_comments() {
        let page = flatten("a<!-- 10:00 40 w/m2 -->b");
        assert_eq!(page.text, "ab");
    }

    #[test]
    fn keeps_a_dangling_angle_bracket() {
        let page = flatten("5 < 7 and no tag follows");
        assert_eq!(page.text, "5 < 7 and no tag follows");
    }

    #[test]
    fn records_heading_spans() {
        let page = flatten("<h3>Tuesday, January 20</h3><p>Total solar radiation: 579 wh/m2.</p>");
        let window = 0..page.text.len();
        assert_eq!(page.heading_within(&window), Some("Tuesday, January 20"));
    }

    #[test]
    fn closest_heading_wins() {
        let page = flatten("<h3>January 19</h3>first<h3>January 20</h3>second");
        let window = 0..page.text.len();
        assert_eq!(page.heading_within(&window), Some("January 20"));
    }

    #[test]
    fn headings_outside_the_window_are_ignored() {
        let page = flatten("<h3>January 19</h3>tail");
        let heading_end = page.text.len() - "tail".len();
        assert_eq!(page.heading_within(&(heading_end..page.text.len())), None);
    }

    #[test]
    fn tolerates_an_unclosed_heading() {
        let page = flatten("<h3>January 19 and the page just ends");
        assert_eq!(page.text, "January 19 and the page just ends");
        assert_eq!(page.heading_within(&(0..page.text.len())), None);
    }
}
