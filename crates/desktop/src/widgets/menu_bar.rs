use iced::widget::{button, column, container, row, text};
use iced::{Element, Length};

use crate::app::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    File,
    Setting,
    Help,
}

/// Entries shown when a menu is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Exit,
    /// Placeholder entry; selecting it does nothing.
    Database,
}

impl Menu {
    pub const ALL: &[Menu] = &[Menu::File, Menu::Setting, Menu::Help];

    pub fn label(self) -> &'static str {
        match self {
            Menu::File => "File",
            Menu::Setting => "Setting",
            Menu::Help => "Help",
        }
    }

    pub fn items(self) -> &'static [MenuItem] {
        match self {
            Menu::File => &[MenuItem::Exit],
            Menu::Setting => &[MenuItem::Database],
            Menu::Help => &[],
        }
    }
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Exit => "Exit",
            MenuItem::Database => "Database",
        }
    }
}

/// Menu bar plus the drop-down of the currently open menu, if any.
pub fn view<'a>(open: Option<Menu>) -> Element<'a, Message> {
    let bar = row(Menu::ALL
        .iter()
        .map(|&menu| {
            let btn = button(text(menu.label()).size(13))
                .on_press(Message::MenuToggled(menu))
                .padding([4, 12]);
            if open == Some(menu) {
                btn.style(button::primary).into()
            } else {
                btn.style(button::text).into()
            }
        })
        .collect::<Vec<_>>())
    .spacing(2);

    let Some(menu) = open else {
        return bar.into();
    };

    let items = column(menu
        .items()
        .iter()
        .map(|&item| {
            button(text(item.label()).size(13))
                .on_press(Message::MenuItemSelected(item))
                .padding([4, 16])
                .width(Length::Fixed(140.0))
                .style(button::text)
                .into()
        })
        .collect::<Vec<_>>());

    column![bar, container(items).style(container::rounded_box)].into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_entries() {
        assert_eq!(Menu::File.items(), &[MenuItem::Exit]);
        assert_eq!(Menu::Setting.items(), &[MenuItem::Database]);
        assert!(Menu::Help.items().is_empty());
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = Menu::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels, ["File", "Setting", "Help"]);
        assert_eq!(MenuItem::Exit.label(), "Exit");
    }
}
