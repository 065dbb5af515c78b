use crate::utils::BackendProfile;

// ============================================================================
// Template markers
// ============================================================================

pub const INPUT1_MARKER: &str = "[input1]";
pub const INPUT2_MARKER: &str = "[input2]";

pub const CANCELLED_MARKER: &str = "=== cancelled ===";
pub const FINISHED_MARKER: &str = "=== done ===";

/// Which of the two input fields the selected template body calls for.
/// A field whose marker is absent is disabled and its content ignored.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RequiredInputs {
    pub first: bool,
    pub second: bool,
}

pub fn required_inputs(body: &str) -> RequiredInputs {
    RequiredInputs {
        first: body.contains(INPUT1_MARKER),
        second: body.contains(INPUT2_MARKER),
    }
}

pub fn validate_inputs(required: RequiredInputs, input1: &str, input2: &str) -> Result<(), String> {
    if required.first && input1.trim().is_empty() {
        return Err("input 1 is required by the selected template".to_string());
    }
    if required.second && input2.trim().is_empty() {
        return Err("input 2 is required by the selected template".to_string());
    }
    Ok(())
}

/// Substitutes both markers with the trimmed, length-capped user inputs.
pub fn compose_prompt(body: &str, input1: &str, input2: &str, max_chars: usize) -> String {
    let first = truncate_chars(input1.trim(), max_chars);
    let second = truncate_chars(input2.trim(), max_chars);
    body.replace(INPUT1_MARKER, first)
        .replace(INPUT2_MARKER, second)
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// Appends a marker line to the transcript without disturbing already
/// rendered chunks.
pub fn append_marker(transcript: &mut String, marker: &str) {
    if !transcript.is_empty() && !transcript.ends_with('\n') {
        transcript.push('\n');
    }
    transcript.push_str(marker);
    transcript.push('\n');
}

/// The run-parameters banner written at the top of the output when a send
/// starts.
pub fn run_banner(profile: &BackendProfile, template_title: &str, max_chars: usize) -> String {
    format!(
        "[run] profile: {} | model: {} | timeout: {}s | input cap: {} | template: {}\n\n",
        profile.name, profile.model, profile.timeout_secs, max_chars, template_title
    )
}

pub fn format_elapsed(secs: f64) -> String {
    format!("{:.2}s", secs)
}

// ============================================================================
// Selection reconciliation
// ============================================================================

/// Keeps a selector pointing at a valid entry after a reload: the current
/// selection if it survived, else the first remaining entry, else empty.
pub fn reconcile_selection(names: &[String], current: Option<&str>) -> Option<String> {
    match current {
        Some(name) if names.iter().any(|n| n == name) => Some(name.to_string()),
        _ => names.first().cloned(),
    }
}

// ============================================================================
// Think-tag rewriting
// ============================================================================

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";
const THINK_OPEN_VISIBLE: &str = "[thinking]";
const THINK_CLOSE_VISIBLE: &str = "[/thinking]";

/// Streaming rewrite of `<think>`/`</think>` markers into their visible
/// bracketed equivalents. A tag split across chunk boundaries is held back
/// until enough text arrives to decide, so raw tags never reach the view.
#[derive(Debug, Default)]
pub struct ThinkRewriter {
    pending: String,
}

impl ThinkRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the text safe to display now.
    pub fn push(&mut self, chunk: &str) -> String {
        self.pending.push_str(chunk);
        let mut out = self
            .pending
            .replace(THINK_OPEN, THINK_OPEN_VISIBLE)
            .replace(THINK_CLOSE, THINK_CLOSE_VISIBLE);

        let hold_from = match out.rfind('<') {
            Some(idx) if is_partial_tag(&out[idx..]) => idx,
            _ => out.len(),
        };
        self.pending = out.split_off(hold_from);
        out
    }

    /// Releases whatever is still held back. A trailing fragment that never
    /// became a complete tag is emitted as-is.
    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }
}

fn is_partial_tag(suffix: &str) -> bool {
    suffix.len() < THINK_CLOSE.len()
        && (THINK_OPEN.starts_with(suffix) || THINK_CLOSE.starts_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BackendProfile {
        BackendProfile {
            name: "local".to_string(),
            endpoint: "http://localhost:11434/api/generate".to_string(),
            api_key: None,
            model: "deepseek-r1:1.5b".to_string(),
            timeout_secs: 60,
        }
    }

    #[test]
    fn marker_detection() {
        assert_eq!(
            required_inputs("Summarize: [input1]"),
            RequiredInputs {
                first: true,
                second: false
            }
        );
        assert_eq!(
            required_inputs("Compare [input1] with [input2]"),
            RequiredInputs {
                first: true,
                second: true
            }
        );
        assert_eq!(required_inputs("no markers here"), RequiredInputs::default());
    }

    #[test]
    fn only_first_marker_allows_empty_second_input() {
        let required = required_inputs("Summarize: [input1]");
        assert!(validate_inputs(required, "some text", "").is_ok());
    }

    #[test]
    fn required_second_input_rejects_empty() {
        let required = required_inputs("Compare [input1] with [input2]");
        assert!(validate_inputs(required, "left", "").is_err());
        assert!(validate_inputs(required, "left", "   ").is_err());
        assert!(validate_inputs(required, "left", "right").is_ok());
    }

    #[test]
    fn compose_substitutes_trimmed_inputs() {
        let prompt = compose_prompt("A=[input1] B=[input2]", "  one  ", "\ttwo\n", 100);
        assert_eq!(prompt, "A=one B=two");
    }

    #[test]
    fn compose_caps_input_length_in_chars() {
        let prompt = compose_prompt("[input1]", "abcdef", "", 3);
        assert_eq!(prompt, "abc");

        // Cap counts characters, not bytes.
        let prompt = compose_prompt("[input1]", "ééééé", "", 3);
        assert_eq!(prompt, "ééé");
    }

    #[test]
    fn compose_ignores_absent_marker() {
        let prompt = compose_prompt("just [input1]", "x", "ignored", 100);
        assert_eq!(prompt, "just x");
    }

    #[test]
    fn chunk_concatenation_is_order_preserving() {
        // ["Hel", "lo"] then finish must display exactly what "Hello" at
        // once would.
        let mut split = String::new();
        let mut rewriter = ThinkRewriter::new();
        split.push_str(&rewriter.push("Hel"));
        split.push_str(&rewriter.push("lo"));
        split.push_str(&rewriter.finish());
        append_marker(&mut split, FINISHED_MARKER);

        let mut whole = String::new();
        let mut rewriter = ThinkRewriter::new();
        whole.push_str(&rewriter.push("Hello"));
        whole.push_str(&rewriter.finish());
        append_marker(&mut whole, FINISHED_MARKER);

        assert_eq!(split, whole);
        assert_eq!(split, "Hello\n=== done ===\n");
    }

    #[test]
    fn cancellation_keeps_rendered_text_intact() {
        let mut transcript = String::from("partial answ");
        append_marker(&mut transcript, CANCELLED_MARKER);
        assert_eq!(transcript, "partial answ\n=== cancelled ===\n");
        assert_eq!(transcript.matches(CANCELLED_MARKER).count(), 1);
    }

    #[test]
    fn think_tags_rewritten_within_one_chunk() {
        let mut rewriter = ThinkRewriter::new();
        let out = rewriter.push("<think>hmm</think>answer");
        assert_eq!(out, "[thinking]hmm[/thinking]answer");
        assert_eq!(rewriter.finish(), "");
    }

    #[test]
    fn think_tag_split_across_chunks() {
        let mut rewriter = ThinkRewriter::new();
        let mut out = String::new();
        out.push_str(&rewriter.push("before <th"));
        out.push_str(&rewriter.push("ink>deep</th"));
        out.push_str(&rewriter.push("ink> after"));
        out.push_str(&rewriter.finish());
        assert_eq!(out, "before [thinking]deep[/thinking] after");
    }

    #[test]
    fn lone_angle_bracket_is_not_swallowed() {
        let mut rewriter = ThinkRewriter::new();
        let mut out = String::new();
        out.push_str(&rewriter.push("a < b and a <x"));
        out.push_str(&rewriter.finish());
        assert_eq!(out, "a < b and a <x");
    }

    #[test]
    fn trailing_partial_tag_is_released_on_finish() {
        let mut rewriter = ThinkRewriter::new();
        let out = rewriter.push("ends with <thi");
        assert_eq!(out, "ends with ");
        assert_eq!(rewriter.finish(), "<thi");
    }

    #[test]
    fn run_banner_names_the_run_parameters() {
        let banner = run_banner(&profile(), "Translate", 4000);
        assert!(banner.contains("profile: local"));
        assert!(banner.contains("model: deepseek-r1:1.5b"));
        assert!(banner.contains("timeout: 60s"));
        assert!(banner.contains("template: Translate"));
    }

    #[test]
    fn selection_survives_when_still_present() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert_eq!(reconcile_selection(&names, Some("b")), Some("b".to_string()));
    }

    #[test]
    fn deleted_selection_falls_back_to_first_remaining() {
        let names = vec!["a".to_string(), "c".to_string()];
        assert_eq!(reconcile_selection(&names, Some("b")), Some("a".to_string()));
        assert_eq!(reconcile_selection(&[], Some("b")), None);
        assert_eq!(reconcile_selection(&names, None), Some("a".to_string()));
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0.0), "0.00s");
        assert_eq!(format_elapsed(12.345), "12.35s");
    }
}
