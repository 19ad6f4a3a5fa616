//! The textual status menu shown under the glyph.

use crate::model::Space;

pub const QUIT_TITLE: &str = "Quit Space Sorcerer";
pub const PREFERENCES_TITLE: &str = "Preferences…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Preferences,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Disabled section title.
    Header(String),
    /// Informational row for one space.
    Space { title: String, is_current: bool },
    Separator,
    Action { title: String, key: char, action: MenuAction },
}

/// Builds the menu for a snapshot. The space section is omitted when the
/// snapshot is empty.
pub fn entries(spaces: &[Space]) -> Vec<MenuEntry> {
    let mut menu = Vec::with_capacity(spaces.len() + 5);

    if !spaces.is_empty() {
        menu.push(MenuEntry::Header("Spaces".into()));
        menu.extend(spaces.iter().map(|space| MenuEntry::Space {
            title: space_title(space),
            is_current: space.is_current,
        }));
        menu.push(MenuEntry::Separator);
    }

    menu.push(MenuEntry::Action {
        title: PREFERENCES_TITLE.into(),
        key: ',',
        action: MenuAction::Preferences,
    });
    menu.push(MenuEntry::Separator);
    menu.push(MenuEntry::Action {
        title: QUIT_TITLE.into(),
        key: 'q',
        action: MenuAction::Quit,
    });
    menu
}

fn space_title(space: &Space) -> String {
    let marker = if space.is_current { "► " } else { "   " };
    let mut title = format!("{marker}{}: {}", space.global_index, space.name);
    if space.is_full_screen {
        title.push_str(" (FS)");
    }
    title
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::SpaceId;

    fn space(index: usize, name: &str, is_current: bool, is_full_screen: bool) -> Space {
        Space {
            display_id: "Main".into(),
            space_id: SpaceId::new(index as u64 * 10),
            name: name.into(),
            global_index: index,
            is_current,
            is_full_screen,
        }
    }

    fn titles(menu: &[MenuEntry]) -> Vec<String> {
        menu.iter()
            .map(|entry| match entry {
                MenuEntry::Header(title) => format!("[{title}]"),
                MenuEntry::Space { title, .. } | MenuEntry::Action { title, .. } => title.clone(),
                MenuEntry::Separator => "---".into(),
            })
            .collect()
    }

    #[test]
    fn lists_spaces_then_actions() {
        let menu = entries(&[
            space(1, "Work", false, false),
            space(2, "2", true, false),
            space(3, "Safari", false, true),
        ]);
        assert_eq!(
            titles(&menu),
            vec![
                "[Spaces]",
                "   1: Work",
                "► 2: 2",
                "   3: Safari (FS)",
                "---",
                "Preferences…",
                "---",
                "Quit Space Sorcerer",
            ]
        );
        assert!(matches!(menu[2], MenuEntry::Space { is_current: true, .. }));
    }

    #[test]
    fn empty_snapshot_has_only_actions() {
        let menu = entries(&[]);
        assert_eq!(titles(&menu), vec!["Preferences…", "---", "Quit Space Sorcerer"]);
        assert_eq!(
            menu[2],
            MenuEntry::Action { title: QUIT_TITLE.into(), key: 'q', action: MenuAction::Quit }
        );
    }
}
