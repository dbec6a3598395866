use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kbswitch", version, about = "Switch between saved keyboard layouts")]
pub struct Cli {
    #[arg(short = 'n', long, help = "Next mapping")]
    pub next: bool,
    #[arg(short = 'p', long, help = "Previous mapping")]
    pub previous: bool,
    #[arg(short = 's', long, value_name = "NAME", help = "Set current mapping to NAME")]
    pub set: Option<String>,
    #[arg(
        short = 'S',
        long,
        value_name = "N",
        allow_negative_numbers = true,
        help = "Set current mapping to number N (negative selects the last)"
    )]
    pub set_number: Option<isize>,
    #[arg(short = 'a', long, value_name = "NAME", help = "Add the active layout as mapping NAME")]
    pub add: Option<String>,
    #[arg(long, value_name = "N", requires = "add", help = "Insert the added mapping at position N")]
    pub at: Option<usize>,
    #[arg(short = 'r', long, value_name = "NAME", help = "Remove mapping with name NAME")]
    pub remove: Option<String>,
    #[arg(short = 'R', long, value_name = "N", help = "Remove mapping with number N")]
    pub remove_number: Option<usize>,
    #[arg(
        short = 'o',
        long,
        num_args = 2,
        value_names = ["FROM", "TO"],
        help = "Move mapping at place FROM to place TO"
    )]
    pub order: Option<Vec<usize>>,
    #[arg(short = 'c', long, help = "Print current mapping")]
    pub current: bool,
    #[arg(short = 'l', long, help = "List mappings in order")]
    pub list: bool,
    #[arg(short = 'd', long, help = "Print mappings in order with details")]
    pub details: bool,
    #[arg(long, value_name = "NAME", help = "Print details of mapping NAME")]
    pub show: Option<String>,
    #[arg(long, help = "Show a desktop notification after switching")]
    pub notify: bool,
    #[arg(long, value_name = "DIR", help = "Directory holding saved mappings")]
    pub config_dir: Option<PathBuf>,
}

/// The single thing an invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Current,
    List,
    Details,
    Show(String),
    Add { name: String, at: Option<usize> },
    RemoveNumber(usize),
    Remove(String),
    Order { from: usize, to: usize },
    Next,
    Previous,
    SetNumber(isize),
    Set(String),
    /// No verb given
    Idle,
}

impl Action {
    /// Verbs that need at least one saved mapping
    pub fn needs_mappings(&self) -> bool {
        matches!(
            self,
            Action::RemoveNumber(_)
                | Action::Remove(_)
                | Action::Order { .. }
                | Action::Next
                | Action::Previous
                | Action::SetNumber(_)
                | Action::Set(_)
        )
    }

    /// Verbs after which `--notify` fires
    pub fn may_notify(&self) -> bool {
        matches!(
            self,
            Action::Next | Action::Previous | Action::SetNumber(_) | Action::Set(_) | Action::Idle
        )
    }
}

impl Cli {
    /// Pick the action when several flags are given; the first match wins.
    pub fn action(&self) -> Action {
        if self.current {
            return Action::Current;
        }
        if self.list {
            return Action::List;
        }
        if self.details {
            return Action::Details;
        }
        if let Some(name) = &self.show {
            return Action::Show(name.clone());
        }
        if let Some(name) = &self.add {
            return Action::Add {
                name: name.clone(),
                at: self.at,
            };
        }
        if let Some(index) = self.remove_number {
            return Action::RemoveNumber(index);
        }
        if let Some(name) = &self.remove {
            return Action::Remove(name.clone());
        }
        if let Some([from, to]) = self.order.as_deref() {
            return Action::Order { from: *from, to: *to };
        }
        if self.next {
            return Action::Next;
        }
        if self.previous {
            return Action::Previous;
        }
        if let Some(index) = self.set_number {
            return Action::SetNumber(index);
        }
        if let Some(name) = &self.set {
            return Action::Set(name.clone());
        }
        Action::Idle
    }
}
