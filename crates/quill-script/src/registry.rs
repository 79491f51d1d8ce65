//! The command registry: commands, groups, flag lookup, and the type
//! registry they validate against.
//!
//! The registry is an explicit value built once (see
//! [`crate::register_builtin_commands`]) and then moved into the
//! interpreter, which freezes the visible command set at construction.

use std::collections::HashMap;
use std::rc::Rc;

use quill_types::error::{QuillError, Result};
use quill_types::types::TypeRegistry;

use crate::command::Command;

/// A documentation bucket for commands.
#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub name: String,
    pub description: String,
    /// Sort key for listings; lower sorts first.
    pub priority: i32,
    /// Excluded from default listings.
    pub blacklisted: bool,
}

impl CommandGroup {
    pub fn new(name: &str, description: &str, priority: i32) -> Self {
        CommandGroup {
            name: name.to_string(),
            description: description.to_string(),
            priority,
            blacklisted: false,
        }
    }

    pub fn blacklisted(mut self) -> Self {
        self.blacklisted = true;
        self
    }
}

/// Registry of commands and groups with O(1) name and flag lookup.
#[derive(Default)]
pub struct CommandRegistry {
    types: TypeRegistry,
    commands: HashMap<String, Rc<Command>>,
    groups: HashMap<String, Rc<CommandGroup>>,
    long_flags: HashMap<String, String>,
    short_flags: HashMap<char, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Register a group.
    pub fn register_group(&mut self, group: CommandGroup) -> Result<Rc<CommandGroup>> {
        if self.groups.contains_key(&group.name) {
            return Err(QuillError::DuplicateGroup(group.name));
        }
        let rc = Rc::new(group);
        self.groups.insert(rc.name.clone(), Rc::clone(&rc));
        Ok(rc)
    }

    /// Register a command; the first registration of a name stays active.
    pub fn register(&mut self, command: Command) -> Result<Rc<Command>> {
        if self.commands.contains_key(command.name()) {
            return Err(QuillError::DuplicateCommand(command.name().to_string()));
        }
        if let Some(flag) = command.long_flag()
            && self.long_flags.contains_key(flag)
        {
            return Err(QuillError::DuplicateCommand(format!("--{flag}")));
        }
        if let Some(flag) = command.short_flag()
            && self.short_flags.contains_key(&flag)
        {
            return Err(QuillError::DuplicateCommand(format!("-{flag}")));
        }

        let rc = Rc::new(command);
        if let Some(flag) = rc.long_flag() {
            self.long_flags.insert(flag.to_string(), rc.name().to_string());
        }
        if let Some(flag) = rc.short_flag() {
            self.short_flags.insert(flag, rc.name().to_string());
        }
        self.commands.insert(rc.name().to_string(), Rc::clone(&rc));
        Ok(rc)
    }

    /// Look up by name, failing with `UnknownCommand`.
    pub fn get(&self, name: &str) -> Result<Rc<Command>> {
        self.commands
            .get(name)
            .cloned()
            .ok_or_else(|| QuillError::UnknownCommand(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<Rc<Command>> {
        self.commands.get(name).cloned()
    }

    pub fn by_long_flag(&self, flag: &str) -> Option<Rc<Command>> {
        self.long_flags
            .get(flag)
            .and_then(|name| self.commands.get(name))
            .cloned()
    }

    pub fn by_short_flag(&self, flag: char) -> Option<Rc<Command>> {
        self.short_flags
            .get(&flag)
            .and_then(|name| self.commands.get(name))
            .cloned()
    }

    pub fn group(&self, name: &str) -> Option<Rc<CommandGroup>> {
        self.groups.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands grouped for display: groups sorted by (priority, name),
    /// commands sorted by name within each, blacklisted groups and their
    /// commands omitted. Ungrouped commands come last under `None`.
    pub fn listing(&self) -> Vec<(Option<Rc<CommandGroup>>, Vec<Rc<Command>>)> {
        let mut grouped: HashMap<Option<String>, Vec<Rc<Command>>> = HashMap::new();
        for cmd in self.commands.values() {
            grouped
                .entry(cmd.group().map(str::to_string))
                .or_default()
                .push(Rc::clone(cmd));
        }

        let mut groups: Vec<Rc<CommandGroup>> = self.groups.values().cloned().collect();
        groups.sort_by(|a, b| (a.priority, &a.name).cmp(&(b.priority, &b.name)));

        let mut out = Vec::new();
        for group in groups {
            if group.blacklisted {
                continue;
            }
            if let Some(mut cmds) = grouped.remove(&Some(group.name.clone())) {
                cmds.sort_by(|a, b| a.name().cmp(b.name()));
                out.push((Some(group), cmds));
            }
        }
        // Commands pointing at unknown groups are shown with the ungrouped
        // tail rather than dropped.
        let mut rest: Vec<Rc<Command>> = grouped
            .into_iter()
            .filter(|(name, _)| {
                name.as_deref()
                    .is_none_or(|n| !self.groups.contains_key(n))
            })
            .flat_map(|(_, cmds)| cmds)
            .collect();
        if !rest.is_empty() {
            rest.sort_by(|a, b| a.name().cmp(b.name()));
            out.push((None, rest));
        }
        out
    }
}
