// Selection keys sent back by the user when confirming a staged diff

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectionKey {
    Add(String),
    Remove(String),
    Deposit(String),
    Withdraw(String),
}

impl SelectionKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let (prefix, asset_id) = raw.trim().split_once('-')?;
        if asset_id.is_empty() {
            return None;
        }
        let asset_id = asset_id.to_string();
        match prefix {
            "add" => Some(SelectionKey::Add(asset_id)),
            "remove" => Some(SelectionKey::Remove(asset_id)),
            "deposit" => Some(SelectionKey::Deposit(asset_id)),
            "withdraw" => Some(SelectionKey::Withdraw(asset_id)),
            _ => None,
        }
    }

    pub fn asset_id(&self) -> &str {
        match self {
            SelectionKey::Add(id)
            | SelectionKey::Remove(id)
            | SelectionKey::Deposit(id)
            | SelectionKey::Withdraw(id) => id,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKey::Add(id) => write!(f, "add-{}", id),
            SelectionKey::Remove(id) => write!(f, "remove-{}", id),
            SelectionKey::Deposit(id) => write!(f, "deposit-{}", id),
            SelectionKey::Withdraw(id) => write!(f, "withdraw-{}", id),
        }
    }
}
