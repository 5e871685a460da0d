use colored::*;

pub struct Menu;

impl Menu {
    pub fn parse_choice(input: &str) -> Option<usize> {
        let s = input.trim();
        if let Ok(n) = s.parse::<usize>() {
            return Some(n);
        }
        // full-width digits
        let clean: String = s
            .chars()
            .map(|c| match c {
                '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
                _ => c,
            })
            .filter(|c| c.is_ascii_digit())
            .collect();
        clean.parse::<usize>().ok()
    }

    pub fn render(root_available: bool) {
        println!(
            "\n{} {} {}",
            "===".bright_cyan(),
            "Privileged package operations".bright_white().bold(),
            "===".bright_cyan()
        );
        if !root_available {
            println!("  {}", "(no su binary found, elevation will likely fail)".bright_yellow());
        }
        let items = [
            ("1", "Check for su binary"),
            ("2", "Install APK"),
            ("3", "Uninstall package"),
            ("4", "Show hardware address"),
        ];
        for (k, label) in items {
            println!("  {}) {}", k.bright_cyan(), label);
        }
        println!("  {}) {}", "q".bright_red(), "Quit");
    }
}
