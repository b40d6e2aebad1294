/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    File contains Clock and Timer types, used to count adapter clock edges and
    to defer responder and reset actions by a number of edges.

--*/
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeSet, HashSet},
    ptr,
    rc::Rc,
};

use crate::Bus;

/// Components that want deferred execution store a clone of Timer and use it
/// to schedule a future [`Bus::poll`] or a warm reset of the adapter.
///
/// # Example
///
/// ```
/// use axil_emu_bus::{ActionHandle, Bus, BusError, Clock, Timer};
/// use axil_emu_types::{AxiAddr, AxiData};
///
/// struct SlowReg {
///     timer: Timer,
///     ready: Option<ActionHandle>,
///     val: AxiData,
/// }
/// impl Bus for SlowReg {
///     fn read(&mut self, _addr: AxiAddr) -> Result<AxiData, BusError> {
///         Ok(self.val)
///     }
///     fn write(&mut self, _addr: AxiAddr, val: AxiData) -> Result<(), BusError> {
///         self.val = val;
///         self.ready = Some(self.timer.schedule_poll_in(3));
///         Ok(())
///     }
///     fn poll(&mut self) {
///         if self.timer.fired(&mut self.ready) {
///             self.val += 1;
///         }
///     }
/// }
///
/// let clock = Clock::new();
/// let mut reg = SlowReg { timer: clock.timer(), ready: None, val: 0 };
/// reg.write(0, 7).unwrap();
/// clock.increment_and_process_timer_actions(3, &mut reg);
/// assert_eq!(reg.read(0), Ok(8));
/// ```
#[derive(Clone)]
pub struct Timer {
    clock: Rc<ClockImpl>,
}
impl Timer {
    /// Constructs a new timer bound to the specified clock.
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: Rc::clone(&clock.clock),
        }
    }

    /// Returns the number of clock edges since simulation start.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// If the scheduled time for `action` has come, `action` will be set to
    /// None and the function will return true. Otherwise (or if action is None),
    /// the function will return false.
    pub fn fired(&self, action: &mut Option<ActionHandle>) -> bool {
        let has_fired = match action {
            Some(action) => {
                debug_assert_eq!(
                    action.0.id.timer_ptr,
                    Rc::as_ptr(&self.clock),
                    "Supplied action was not created by this timer."
                );
                self.clock.now() >= action.0.time
            }
            None => false,
        };
        if has_fired {
            *action = None;
        }
        has_fired
    }

    /// Schedules a future call to [`Bus::poll()`] at `self.now() + ticks_from_now`.
    pub fn schedule_poll_in(&self, ticks_from_now: u64) -> ActionHandle {
        self.schedule_action_in(ticks_from_now, TimerAction::Poll)
    }

    /// Schedules `action` at `self.now() + ticks_from_now`.
    pub fn schedule_action_in(&self, ticks_from_now: u64, action: TimerAction) -> ActionHandle {
        self.clock
            .schedule_action_at(self.now().saturating_add(ticks_from_now), action)
    }

    /// Cancels a previously scheduled action.
    ///
    /// * Panics
    ///
    /// Panics if the supplied `ActionHandle` was not created by this Timer.
    pub fn cancel(&self, handle: ActionHandle) {
        self.clock.cancel(handle)
    }
}

pub struct Clock {
    clock: Rc<ClockImpl>,
}
impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
impl Clock {
    /// Constructs a new Clock with the edge counter set to 0.
    pub fn new() -> Clock {
        Self {
            clock: ClockImpl::new(),
        }
    }

    /// Constructs a `Timer` associated with this clock.
    pub fn timer(&self) -> Timer {
        Timer::new(self)
    }

    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Increments the clock by `delta`, and returns the timer actions that fired.
    #[inline]
    pub fn increment(&self, delta: u64) -> HashSet<TimerAction> {
        self.clock.increment(delta)
    }

    /// Increments the clock by `delta`, and notifies the bus of any fired
    /// timer actions.
    pub fn increment_and_process_timer_actions(
        &self,
        delta: u64,
        bus: &mut impl Bus,
    ) -> HashSet<TimerAction> {
        let fired_actions = self.increment(delta);
        for action in fired_actions.iter() {
            match action {
                TimerAction::Poll => bus.poll(),
                TimerAction::WarmReset => bus.warm_reset(),
            }
        }
        fired_actions
    }
}

/// Represents an action scheduled with a `Timer`. Returned by
/// [`Timer::schedule_poll_in`] and passed to [`Timer::fired()`] or
/// [`Timer::cancel`].
pub struct ActionHandle(ActionHandleImpl);

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct ActionHandleImpl {
    /// The time the action is supposed to fire.
    time: u64,

    id: TimerActionId,

    action: TimerAction,
}

#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
struct TimerActionId {
    /// Identifies the clock the action was scheduled on.
    timer_ptr: *const ClockImpl,

    id: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TimerAction {
    /// Call [`Bus::poll`]
    Poll,

    /// Pulse the adapter reset
    WarmReset,
}

struct ClockImpl {
    now: Cell<u64>,
    next_action_id: Cell<u64>,
    action_handles: RefCell<BTreeSet<ActionHandleImpl>>,
}
impl ClockImpl {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            now: Cell::new(0),
            next_action_id: Cell::new(0),
            action_handles: RefCell::new(BTreeSet::new()),
        })
    }

    #[inline]
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn increment(&self, delta: u64) -> HashSet<TimerAction> {
        self.now.set(self.now.get().saturating_add(delta));
        let mut fired_actions = HashSet::new();
        let mut actions = self.action_handles.borrow_mut();
        while let Some(action) = actions.first().copied() {
            if action.time > self.now() {
                break;
            }
            actions.remove(&action);
            fired_actions.insert(action.action);
        }
        fired_actions
    }

    fn schedule_action_at(self: &Rc<Self>, time: u64, action: TimerAction) -> ActionHandle {
        let new_action = ActionHandleImpl {
            time,
            id: TimerActionId {
                timer_ptr: Rc::as_ptr(self),
                id: self.next_action_id.get(),
            },
            action,
        };
        self.next_action_id
            .set(self.next_action_id.get().wrapping_add(1));
        self.action_handles.borrow_mut().insert(new_action);
        ActionHandle(new_action)
    }

    fn cancel(self: &Rc<Self>, handle: ActionHandle) {
        let action = handle.0;
        assert!(
            ptr::eq(Rc::as_ptr(self), action.id.timer_ptr),
            "Supplied action was not created by this timer."
        );
        self.action_handles.borrow_mut().remove(&action);
    }
}
