use std::collections::HashMap;

use sysinfo::Users;

/// UID to user name lookup, loaded once from the platform user database.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<u32, String>,
}

impl UserDirectory {
    pub fn from_system() -> Self {
        let users = Users::new_with_refreshed_list();
        let names = users
            .list()
            .iter()
            .map(|user| (**user.id(), user.name().to_string()))
            .collect();
        UserDirectory { names }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        UserDirectory {
            names: entries
                .into_iter()
                .map(|(uid, name)| (uid, name.into()))
                .collect(),
        }
    }

    /// Name for `uid`, or the numeric UID when it is not in the directory.
    pub fn resolve(&self, uid: u32) -> String {
        self.names
            .get(&uid)
            .cloned()
            .unwrap_or_else(|| uid.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
