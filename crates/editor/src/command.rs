use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use vellum_dom::Element;

use crate::error::EditorError;
use crate::event::Event;
use crate::session::EditorSession;

/// The built-in command set handled by [`EditorSession::command_handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    Bold,
    Underline,
    Italic,
    Strike,
    Subscript,
    Superscript,
    RemoveFormat,
    Indent,
    Outdent,
    Undo,
    Redo,
    FullScreen,
    ShowBlocks,
    CodeView,
    Preview,
    Print,
}

impl Command {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" => Some(Self::Bold),
            "underline" => Some(Self::Underline),
            "italic" => Some(Self::Italic),
            "strike" | "strikethrough" => Some(Self::Strike),
            "subscript" => Some(Self::Subscript),
            "superscript" => Some(Self::Superscript),
            "removeFormat" => Some(Self::RemoveFormat),
            "indent" => Some(Self::Indent),
            "outdent" => Some(Self::Outdent),
            "undo" => Some(Self::Undo),
            "redo" => Some(Self::Redo),
            "fullScreen" => Some(Self::FullScreen),
            "showBlocks" => Some(Self::ShowBlocks),
            "codeView" => Some(Self::CodeView),
            "preview" => Some(Self::Preview),
            "print" => Some(Self::Print),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Underline => "underline",
            Self::Italic => "italic",
            Self::Strike => "strike",
            Self::Subscript => "subscript",
            Self::Superscript => "superscript",
            Self::RemoveFormat => "removeFormat",
            Self::Indent => "indent",
            Self::Outdent => "outdent",
            Self::Undo => "undo",
            Self::Redo => "redo",
            Self::FullScreen => "fullScreen",
            Self::ShowBlocks => "showBlocks",
            Self::CodeView => "codeView",
            Self::Preview => "preview",
            Self::Print => "print",
        }
    }

    /// Inline-wrapper tags that make this command read as active.
    fn active_tags(&self) -> &'static [&'static str] {
        match self {
            Self::Bold => &["strong", "b"],
            Self::Underline => &["u", "ins"],
            Self::Italic => &["em", "i"],
            Self::Strike => &["del", "s", "strike"],
            Self::Subscript => &["sub"],
            Self::Superscript => &["sup"],
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandDisplay {
    Command,
    Submenu,
    Dialog,
    Container,
}

impl EditorSession {
    /// Routes a toolbar/plugin command by display kind: `Command` goes to
    /// the built-in handler, the rest to the named plugin's action (with
    /// submenu/container open-state bookkeeping). Ignored while a change
    /// notification is in flight.
    pub fn action_call(
        &mut self,
        command: &str,
        display: CommandDisplay,
        args: Option<Value>,
    ) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        if self.notifying {
            return Ok(());
        }
        let display_kind = display;
        debug!(command, display = ?display_kind, "action call");
        match display {
            CommandDisplay::Command => {
                let command = Command::from_name(command)
                    .ok_or_else(|| EditorError::UnknownCommand(command.to_string()))?;
                self.command_handler(command)
            }
            CommandDisplay::Submenu => {
                let plugin = self
                    .registry
                    .get(command)
                    .ok_or_else(|| EditorError::UnknownPlugin(command.to_string()))?;
                self.controllers_off();
                if self.submenu_active.as_deref() == Some(command) {
                    self.submenu_active = None;
                    return Ok(());
                }
                self.submenu_active = Some(command.to_string());
                plugin.action(self, args)
            }
            CommandDisplay::Dialog => {
                let plugin = self
                    .registry
                    .get(command)
                    .ok_or_else(|| EditorError::UnknownPlugin(command.to_string()))?;
                self.controllers_off();
                self.submenu_active = None;
                plugin.action(self, args)
            }
            CommandDisplay::Container => {
                let plugin = self
                    .registry
                    .get(command)
                    .ok_or_else(|| EditorError::UnknownPlugin(command.to_string()))?;
                if self.container_active.as_deref() == Some(command) {
                    self.container_active = None;
                    return Ok(());
                }
                self.container_active = Some(command.to_string());
                plugin.action(self, args)
            }
        }
    }

    /// Executes a built-in command. Each formatting command is a thin call
    /// into the mutation engine or style normalizer with fixed arguments.
    pub fn command_handler(&mut self, command: Command) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        // in code view only the view-level commands stay live
        if self.is_code_view()
            && !matches!(
                command,
                Command::CodeView | Command::FullScreen | Command::Preview | Command::Print
            )
        {
            return Ok(());
        }

        match command {
            Command::Bold => self.node_change(Some(&Element::new("strong")), &[], &[], false),
            Command::Underline => self.node_change(Some(&Element::new("u")), &[], &[], false),
            Command::Italic => self.node_change(Some(&Element::new("em")), &[], &[], false),
            Command::Strike => self.node_change(Some(&Element::new("del")), &[], &[], false),
            Command::Subscript => {
                self.node_change(Some(&Element::new("sub")), &[], &["sup"], false)
            }
            Command::Superscript => {
                self.node_change(Some(&Element::new("sup")), &[], &["sub"], false)
            }
            Command::RemoveFormat => self.remove_format(),
            Command::Indent => self.indent(false),
            Command::Outdent => self.indent(true),
            Command::Undo => {
                self.undo();
                Ok(())
            }
            Command::Redo => {
                self.redo();
                Ok(())
            }
            Command::FullScreen => {
                self.toggle_full_screen();
                Ok(())
            }
            Command::ShowBlocks => {
                self.toggle_display_blocks();
                Ok(())
            }
            Command::CodeView => {
                self.toggle_code_view();
                Ok(())
            }
            Command::Preview => {
                let contents = self.get_contents();
                self.dispatch(Event::Preview { contents });
                Ok(())
            }
            Command::Print => {
                let contents = self.get_contents();
                self.dispatch(Event::Print { contents });
                Ok(())
            }
        }
    }

    /// Removes every inline format of the current selection.
    pub fn remove_format(&mut self) -> Result<(), EditorError> {
        self.node_change(None, &[], &[], false)
    }

    /// Adjusts `margin-left` on the selected format elements by 25px per
    /// step, floored at zero.
    pub fn indent(&mut self, outdent: bool) -> Result<(), EditorError> {
        if !self.is_enabled() {
            return Err(EditorError::Disabled);
        }
        let formats = self.get_selected_elements(None);
        if formats.is_empty() {
            return Ok(());
        }
        for fmt in formats {
            let Some(element) = self.tree.element_mut(fmt) else {
                continue;
            };
            let current = element
                .style("margin-left")
                .and_then(parse_px)
                .unwrap_or(0);
            let next = if outdent {
                current.saturating_sub(25)
            } else {
                current + 25
            };
            if next == 0 {
                element.remove_style("margin-left");
            } else {
                element.set_style("margin-left", format!("{next}px"));
            }
        }
        self.history_push();
        Ok(())
    }

    /// Toolbar state: whether a built-in command reads as active for the
    /// current selection.
    pub fn command_active(&self, command: Command) -> bool {
        match command {
            Command::FullScreen => return self.is_full_screen(),
            Command::CodeView => return self.is_code_view(),
            Command::ShowBlocks => return self.is_show_blocks(),
            _ => {}
        }
        let tags = command.active_tags();
        if tags.is_empty() {
            return false;
        }
        let Some(node) = self.selection_node() else {
            return false;
        };
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .any(|n| self.tree.tag(n).map(|t| tags.contains(&t)).unwrap_or(false))
    }
}

fn parse_px(value: &str) -> Option<u32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}
