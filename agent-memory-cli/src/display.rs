//! Console rendering of stored memories.

use std::sync::OnceLock;

use memory_core::{MemoryStore, Namespace, SearchItem, SearchRequest};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Longest content shown per memory.
pub const PREVIEW_CHARS: usize = 100;

/// First `max` characters followed by `...` when longer.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Numbered lines `  1. <content>`.
pub fn memory_lines(items: &[SearchItem]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| format!("  {}. {}", i + 1, preview(&s.item.content_text(), PREVIEW_CHARS)))
        .collect()
}

/// Prints every memory under `namespace` (up to `limit`).
pub async fn print_memories(
    store: &dyn MemoryStore,
    namespace: &Namespace,
    title: &str,
    limit: usize,
) -> anyhow::Result<usize> {
    let items = store
        .search(SearchRequest::new(namespace.clone()).with_limit(limit))
        .await?;
    if items.is_empty() {
        println!("\n{}: no memories found", title);
    } else {
        println!("\n{} ({} found):", title, items.len());
        for line in memory_lines(&items) {
            println!("{}", line);
        }
    }
    Ok(items.len())
}

pub fn is_quit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q")
}

static STDIN: OnceLock<Mutex<BufReader<Stdin>>> = OnceLock::new();

/// Reads one trimmed line from stdin after printing `label`; `None` on end of input.
///
/// All calls share one buffered reader, so piped lines are read one per prompt.
pub async fn read_line(label: &str) -> anyhow::Result<Option<String>> {
    let stdin = STDIN.get_or_init(|| Mutex::new(BufReader::new(tokio::io::stdin())));
    let mut reader = stdin.lock().await;
    read_line_from(&mut *reader, label).await
}

/// [`read_line`] over any buffered reader.
pub async fn read_line_from<R>(reader: &mut R, label: &str) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn banner(title: &str) {
    println!("=== {} ===", title);
    println!("{}", "-".repeat(50));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_by_chars() {
        assert_eq!(preview("short", 100), "short");
        let long = "é".repeat(120);
        let shown = preview(&long, 100);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 103);
    }

    #[tokio::test]
    async fn read_line_from_keeps_lines_that_arrive_together() {
        let mut input = &b"create\nbuild a scraper\n"[..];
        assert_eq!(read_line_from(&mut input, "> ").await.unwrap().as_deref(), Some("create"));
        assert_eq!(
            read_line_from(&mut input, "> ").await.unwrap().as_deref(),
            Some("build a scraper")
        );
        assert_eq!(read_line_from(&mut input, "> ").await.unwrap(), None);
    }

    #[test]
    fn quit_words() {
        assert!(is_quit("quit"));
        assert!(is_quit("Q"));
        assert!(is_quit("EXIT"));
        assert!(!is_quit("memories"));
    }
}
