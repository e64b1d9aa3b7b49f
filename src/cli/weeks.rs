// src/cli/weeks.rs — List the program's weeks

use crate::content::ContentStore;

pub fn show_weeks(content: &ContentStore) {
    for w in content.weeks() {
        let practice_line = w
            .display_practice()
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        println!("{}", w.label());
        if !practice_line.is_empty() {
            println!("    {}", practice_line);
        }
    }
}
