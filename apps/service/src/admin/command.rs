/// Operations exposed by the admin surface, shared by the interactive menu
/// and the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    View,
    Add { identifier: String, label: String },
    /// 1-based position as listed by `View`
    Delete { index: usize },
    StartMonitoring,
    Exit,
}

/// Top-level menu selections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    View,
    Add,
    Delete,
    StartMonitoring,
    Exit,
}

pub const MENU_TEXT: &str = "\n--- Admin Panel ---\n\
1. View Entries\n\
2. Add Entry\n\
3. Delete Entry\n\
4. Start Monitoring\n\
5. Exit";

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::View),
            "2" => Some(MenuChoice::Add),
            "3" => Some(MenuChoice::Delete),
            "4" => Some(MenuChoice::StartMonitoring),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// `b` (any case) leaves a sub-flow without changing anything
pub fn is_back(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("b")
}

pub fn parse_index(input: &str) -> Option<usize> {
    input.trim().parse().ok()
}
