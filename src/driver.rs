use std::thread;
use std::time::Duration;

use enigo::{Enigo, MouseButton, MouseControllable};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Seam over the cursor/screen automation backend. Everything that touches
/// the real desktop goes through this trait, so tests can substitute a
/// recorder and dry-run can be verified to never actuate.
pub trait MouseDriver {
    fn screen_size(&mut self) -> (i32, i32);
    fn position(&mut self) -> (i32, i32);
    /// Move the cursor to (x, y), taking roughly `over` to get there.
    fn move_to(&mut self, x: i32, y: i32, over: Duration);
    fn move_rel(&mut self, dx: i32, dy: i32, over: Duration);
    fn click(&mut self, button: Button);
    fn scroll(&mut self, amount: i32);
}

pub struct EnigoDriver {
    enigo: Enigo,
}

impl EnigoDriver {
    pub fn new() -> Self {
        Self {
            enigo: Enigo::new(),
        }
    }
}

impl MouseDriver for EnigoDriver {
    fn screen_size(&mut self) -> (i32, i32) {
        let (w, h) = self.enigo.main_display_size();
        (w as i32, h as i32)
    }

    fn position(&mut self) -> (i32, i32) {
        self.enigo.mouse_location()
    }

    fn move_to(&mut self, x: i32, y: i32, over: Duration) {
        // enigo teleports; the pacing comes from sleeping out the budget.
        self.enigo.mouse_move_to(x, y);
        thread::sleep(over);
    }

    fn move_rel(&mut self, dx: i32, dy: i32, over: Duration) {
        self.enigo.mouse_move_relative(dx, dy);
        thread::sleep(over);
    }

    fn click(&mut self, button: Button) {
        let button = match button {
            Button::Left => MouseButton::Left,
            Button::Right => MouseButton::Right,
        };
        self.enigo.mouse_click(button);
    }

    fn scroll(&mut self, amount: i32) {
        self.enigo.mouse_scroll_y(amount);
    }
}

/// Parking the cursor in any screen corner aborts the run.
pub const FAIL_SAFE_TOLERANCE: i32 = 2;

#[derive(Debug, Error)]
#[error("cursor parked in a screen corner at ({x}, {y})")]
pub struct FailSafeTripped {
    pub x: i32,
    pub y: i32,
}

pub fn check_fail_safe<D: MouseDriver + ?Sized>(driver: &mut D) -> Result<(), FailSafeTripped> {
    let (w, h) = driver.screen_size();
    let (x, y) = driver.position();
    let near = |v: i32, edge: i32| (v - edge).abs() <= FAIL_SAFE_TOLERANCE;
    if (near(x, 0) || near(x, w - 1)) && (near(y, 0) || near(y, h - 1)) {
        return Err(FailSafeTripped { x, y });
    }
    Ok(())
}

#[cfg(test)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverCall {
    MoveTo(i32, i32),
    MoveRel(i32, i32),
    Click(Button),
    Scroll(i32),
}

/// Recording driver for tests: tracks cursor position, never sleeps.
#[cfg(test)]
pub struct ScriptedDriver {
    pub size: (i32, i32),
    pub pos: (i32, i32),
    pub calls: Vec<DriverCall>,
}

#[cfg(test)]
impl ScriptedDriver {
    pub fn new(size: (i32, i32), pos: (i32, i32)) -> Self {
        Self {
            size,
            pos,
            calls: Vec::new(),
        }
    }
}

#[cfg(test)]
impl MouseDriver for ScriptedDriver {
    fn screen_size(&mut self) -> (i32, i32) {
        self.size
    }

    fn position(&mut self) -> (i32, i32) {
        self.pos
    }

    fn move_to(&mut self, x: i32, y: i32, _over: Duration) {
        self.pos = (x, y);
        self.calls.push(DriverCall::MoveTo(x, y));
    }

    fn move_rel(&mut self, dx: i32, dy: i32, _over: Duration) {
        self.pos = (self.pos.0 + dx, self.pos.1 + dy);
        self.calls.push(DriverCall::MoveRel(dx, dy));
    }

    fn click(&mut self, button: Button) {
        self.calls.push(DriverCall::Click(button));
    }

    fn scroll(&mut self, amount: i32) {
        self.calls.push(DriverCall::Scroll(amount));
    }
}
