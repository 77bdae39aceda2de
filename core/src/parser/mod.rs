//! Script extraction from assistant replies
//!
//! A pure function over the reply text. The sole structured signal on the
//! otherwise free-text channel is a fenced block tagged `sh`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SH_FENCE: Regex = Regex::new(r"(?s)```sh(.*?)```").unwrap();
}

/// Extract the executable script from an assistant reply.
///
/// Returns the trimmed interior of the first ```` ```sh ```` fenced block,
/// or `None` when the reply contains no such block. Any additional fenced
/// blocks in the same reply are ignored; multi-block replies are a known
/// limitation, not handled here.
pub fn extract_script(text: &str) -> Option<String> {
    SH_FENCE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_sh_block() {
        let reply = "```sh\nls -la\n```";
        assert_eq!(extract_script(reply).as_deref(), Some("ls -la"));
    }

    #[test]
    fn test_interior_is_trimmed() {
        let reply = "Here you go:\n```sh\n\n  mkdir -p cats\n  mv a.txt cats/\n\n```\nDone.";
        assert_eq!(
            extract_script(reply).as_deref(),
            Some("mkdir -p cats\n  mv a.txt cats/")
        );
    }

    #[test]
    fn test_second_block_ignored() {
        let reply = "```sh\necho first\n```\nand also\n```sh\necho second\n```";
        assert_eq!(extract_script(reply).as_deref(), Some("echo first"));
    }

    #[test]
    fn test_prose_without_fence() {
        let reply = "Some cute animals include puppies, kittens, and rabbits.";
        assert_eq!(extract_script(reply), None);
    }

    #[test]
    fn test_other_language_fences_do_not_match() {
        let reply = "```python\nprint('hi')\n```";
        assert_eq!(extract_script(reply), None);
    }

    #[test]
    fn test_unclosed_fence() {
        let reply = "```sh\nls";
        assert_eq!(extract_script(reply), None);
    }

    #[test]
    fn test_multiline_script_preserved() {
        let reply = "```sh\n# Create the directory\nmkdir -p cats\nmv garfield.txt cats/\n```";
        assert_eq!(
            extract_script(reply).as_deref(),
            Some("# Create the directory\nmkdir -p cats\nmv garfield.txt cats/")
        );
    }
}
