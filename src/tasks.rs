//! Bodies of the three clock tasks.
//!
//! Each loop only returns on a fatal store error; the caller logs it and
//! lets that task end while the others carry on.

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::display::{DisplaySink, Layer, Position};
use crate::edit::Editor;
use crate::keypad::KeySource;
use crate::store::TimeStore;
use crate::{Error, Result};

/// Hands fatal errors back to the loop, logs the rest and lets it carry on.
fn fatal_only(result: Result<()>, task: &str) -> Result<()> {
    match result {
        Err(err) if !err.is_fatal() => {
            warn!("{} task skipped a step: {}", task, err);
            Ok(())
        }
        other => other,
    }
}

/// Advances the time once per tick pulse.
pub async fn advance_loop<M: RawMutex>(store: &TimeStore<M>) -> Result<Infallible> {
    loop {
        store.wait_tick().await;
        fatal_only(store.advance().map(drop), "advance")?;
    }
}

/// Redraws the running time at `at` whenever it changes.
pub async fn refresh_loop<M, D>(
    store: &TimeStore<M>,
    display: &mut D,
    at: Position,
) -> Result<Infallible>
where
    M: RawMutex,
    D: DisplaySink,
{
    loop {
        let changed = store.wait_for_change().await;
        fatal_only(
            changed.map(|time| display.render_time(at, Layer::Time, time)),
            "refresh",
        )?;
    }
}

pub async fn edit_loop<M, K, D>(
    store: &TimeStore<M>,
    keys: &mut K,
    editor: &mut Editor,
    display: &mut D,
) -> Result<Infallible>
where
    M: RawMutex,
    K: KeySource,
    D: DisplaySink,
{
    loop {
        let key = keys.receive().await;
        fatal_only(editor.handle(key, store, display), "edit")?;
    }
}

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::channel::Channel;
    use futures::FutureExt;

    use super::*;
    use crate::config::{EDIT_ORIGIN, TIME_ORIGIN};
    use crate::display::Panel;
    use crate::clock::TimeOfDay;
    use crate::keypad::KeyCode;

    type Store = TimeStore<CriticalSectionRawMutex>;

    #[test]
    fn advance_loop_stops_on_lock_failure() {
        let store = Store::new();
        store.tick();
        let outcome = store.locked(|_| advance_loop(&store).now_or_never());
        assert!(matches!(outcome, Ok(Some(Err(Error::LockHeld)))));
    }

    #[test]
    fn refresh_loop_stops_on_lock_failure() {
        let store = Store::new();
        store.advance().unwrap();
        let mut panel = Panel::new();
        let outcome = store.locked(|_| refresh_loop(&store, &mut panel, TIME_ORIGIN).now_or_never());
        assert!(matches!(outcome, Ok(Some(Err(Error::LockHeld)))));
        assert_eq!(panel.text(Layer::Time), "        ");
    }

    #[test]
    fn edit_loop_stops_on_lock_failure() {
        let store = Store::new();
        let keys: Channel<CriticalSectionRawMutex, KeyCode, 4> = Channel::new();
        keys.try_send(KeyCode::EnterEdit).unwrap();
        keys.try_send(KeyCode::Digit(1)).unwrap();
        let mut rx = keys.receiver();
        let mut editor = Editor::new(EDIT_ORIGIN);
        let mut panel = Panel::new();

        let outcome = store.locked(|_| {
            edit_loop(&store, &mut rx, &mut editor, &mut panel).now_or_never()
        });
        assert!(matches!(outcome, Ok(Some(Err(Error::LockHeld)))));
        assert!(!panel.is_visible(Layer::Edit));
        // The key after the failing one was never taken.
        assert_eq!(keys.try_receive(), Ok(KeyCode::Digit(1)));
    }

    #[test]
    fn non_fatal_errors_are_absorbed() {
        let invalid = Error::InvalidTime {
            hour: 29,
            minute: 0,
            second: 0,
        };
        assert_eq!(fatal_only(Err(invalid), "edit"), Ok(()));
        assert_eq!(fatal_only(Ok(()), "edit"), Ok(()));
        assert_eq!(fatal_only(Err(Error::LockHeld), "edit"), Err(Error::LockHeld));
    }

    #[test]
    fn a_halted_task_leaves_the_store_usable_for_the_others() {
        let store = Store::new();
        store.tick();
        let _ = store.locked(|_| advance_loop(&store).now_or_never());
        store.set(TimeOfDay::new(1, 2, 3).unwrap()).unwrap();
        assert_eq!(store.get(), Ok(TimeOfDay::new(1, 2, 3).unwrap()));
    }
}
