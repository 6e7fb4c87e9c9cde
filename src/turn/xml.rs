//! Turn document rendering.
//!
//! The client receives each completed turn as a single UTF-8 XML document:
//! a `response` root holding one `piece` element per recognized segment, in
//! sequence order, carrying the speaker id, the audio duration in seconds,
//! and the normalized text as element content.

use crate::turn::aggregator::TurnPiece;

/// Renders a completed turn as the wire document.
pub fn render_turn(pieces: &[TurnPiece]) -> String {
    let mut doc = String::from("<response>");
    for piece in pieces {
        doc.push_str(&format!(
            r#"<piece speaker="{}" duration="{:.2}">{}</piece>"#,
            escape(&piece.speaker_id),
            piece.duration.as_secs_f64(),
            escape(&piece.text),
        ));
    }
    doc.push_str("</response>");
    doc
}

/// Escapes text for use in XML content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn piece(sequence: u64, speaker: &str, text: &str, millis: u64) -> TurnPiece {
        TurnPiece {
            sequence,
            speaker_id: speaker.to_string(),
            text: text.to_string(),
            duration: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_empty_turn_renders_bare_root() {
        assert_eq!(render_turn(&[]), "<response></response>");
    }

    #[test]
    fn test_single_piece() {
        let pieces = vec![piece(0, "profile-1", "hello there", 1500)];
        assert_eq!(
            render_turn(&pieces),
            r#"<response><piece speaker="profile-1" duration="1.50">hello there</piece></response>"#
        );
    }

    #[test]
    fn test_multiple_pieces_keep_given_order() {
        let pieces = vec![
            piece(0, "a", "first", 1000),
            piece(1, "b", "second", 2000),
        ];
        let doc = render_turn(&pieces);

        let first = doc.find("first").unwrap();
        let second = doc.find("second").unwrap();
        assert!(first < second);
        assert!(doc.starts_with("<response>"));
        assert!(doc.ends_with("</response>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let pieces = vec![piece(0, "p", "tom & jerry <watch> \"this\"", 500)];
        let doc = render_turn(&pieces);

        assert!(doc.contains("tom &amp; jerry &lt;watch&gt; &quot;this&quot;"));
        assert!(!doc.contains("& jerry"));
    }

    #[test]
    fn test_escape_covers_all_special_chars() {
        assert_eq!(escape("&<>\"'"), "&amp;&lt;&gt;&quot;&apos;");
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_duration_is_seconds_with_two_decimals() {
        let pieces = vec![piece(0, "p", "x", 2250)];
        assert!(render_turn(&pieces).contains(r#"duration="2.25""#));
    }
}
