#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuOption {
    StartGame,
    Quit,
}

impl MenuOption {
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::StartGame => "Start Game",
            MenuOption::Quit => "Quit",
        }
    }
}

pub struct Menu {
    options: Vec<MenuOption>,
    selected: usize,
}

impl Menu {
    pub fn new() -> Self {
        Menu {
            options: vec![MenuOption::StartGame, MenuOption::Quit],
            selected: 0,
        }
    }

    pub fn options(&self) -> &[MenuOption] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> MenuOption {
        self.options[self.selected]
    }

    pub fn select_previous(&mut self) {
        self.selected = (self.selected + self.options.len() - 1) % self.options.len();
    }

    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.options.len();
    }
}

impl Default for Menu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_from_first_wraps_to_last() {
        let mut menu = Menu::new();
        assert_eq!(menu.selected_index(), 0);
        menu.select_previous();
        assert_eq!(menu.selected_index(), menu.options().len() - 1);
        assert_eq!(menu.selected(), MenuOption::Quit);
    }

    #[test]
    fn down_from_last_wraps_to_first() {
        let mut menu = Menu::new();
        menu.select_next();
        assert_eq!(menu.selected(), MenuOption::Quit);
        menu.select_next();
        assert_eq!(menu.selected_index(), 0);
    }

    #[test]
    fn labels() {
        let labels: Vec<_> = Menu::new().options().iter().map(MenuOption::label).collect();
        assert_eq!(labels, ["Start Game", "Quit"]);
    }
}
