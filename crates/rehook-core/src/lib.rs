//! # Positional state and effects
//!
//! rehook is a small reactive-state runtime. A scope body (an ordinary
//! closure) declares values and side effects that persist across
//! re-invocations of that body, paired up positionally, by call order,
//! instead of by name. Writing a value synchronously re-invokes the owning
//! body; the replay makes the same declarations in the same order and picks
//! up the stored state, and effects re-run only when their declared
//! dependencies changed since the previous invocation.
//!
//! ```rust
//! use rehook_core::{Runtime, deps};
//!
//! let rt = Runtime::new();
//! rt.enter(|rt| {
//!     let (greeting, set_greeting) = rt.state(String::from("hello"))?;
//!     println!("{greeting}");
//!
//!     // Runs once, when this site is first recorded; the write re-invokes
//!     // the body, and the slot replays as "hello again".
//!     rt.effect(deps![], move || set_greeting.set(String::from("hello again")))?;
//!     Ok(())
//! })
//! .unwrap();
//! ```
//!
//! ## State
//!
//! [`Runtime::state`] pairs the i-th call of an invocation with the i-th
//! slot of the scope. The first invocation stores the initial value; replays
//! return the most recently written one and ignore the initial. The setter
//! carries a snapshot of the value from its declaration, and
//! [`SetState::update`] computes from that snapshot, not from the slot's
//! current value:
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use rehook_core::{Runtime, SetState};
//!
//! let seen: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
//! let setter: Rc<RefCell<Option<SetState<i32>>>> = Rc::new(RefCell::new(None));
//!
//! let rt = Runtime::new();
//! rt.enter({
//!     let (seen, setter) = (Rc::clone(&seen), Rc::clone(&setter));
//!     move |rt| {
//!         let (count, set_count) = rt.state(0)?;
//!         seen.borrow_mut().push(count);
//!         *setter.borrow_mut() = Some(set_count);
//!         Ok(())
//!     }
//! })
//! .unwrap();
//!
//! let first = setter.borrow().clone().unwrap();
//! first.set(10).unwrap();
//! first.update(|n| n + 1).unwrap(); // 0 + 1: the snapshot is not re-read
//! assert_eq!(*seen.borrow(), vec![0, 10, 1]);
//! ```
//!
//! ## Effects
//!
//! [`Runtime::effect`] records one dependency list per call-order site.
//! An empty list means "run once, when the site is first recorded, and
//! never again". A non-empty list does not run on creation at all; it runs
//! on the replay where some element differs, by identity, from the previous
//! invocation ([`Dep::of`] compares values, [`Dep::shared`] compares `Rc`
//! allocation addresses):
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use rehook_core::{Runtime, SetState, deps};
//!
//! let runs = Rc::new(RefCell::new(0));
//! let setter: Rc<RefCell<Option<SetState<i32>>>> = Rc::new(RefCell::new(None));
//!
//! let rt = Runtime::new();
//! rt.enter({
//!     let (runs, setter) = (Rc::clone(&runs), Rc::clone(&setter));
//!     move |rt| {
//!         let (n, set_n) = rt.state(0)?;
//!         *setter.borrow_mut() = Some(set_n);
//!         rt.effect(deps![n], {
//!             let runs = Rc::clone(&runs);
//!             move || *runs.borrow_mut() += 1
//!         })?;
//!         Ok(())
//!     }
//! })
//! .unwrap();
//! assert_eq!(*runs.borrow(), 0); // non-empty deps: nothing runs on creation
//!
//! let set_n = setter.borrow().clone().unwrap();
//! set_n.set(1).unwrap();
//! assert_eq!(*runs.borrow(), 1); // 1 != 0: the effect ran
//!
//! let set_n = setter.borrow().clone().unwrap();
//! set_n.set(1).unwrap();
//! assert_eq!(*runs.borrow(), 1); // unchanged deps: skipped
//! ```
//!
//! ## The scope tree
//!
//! Calling [`Runtime::enter`] inside a body creates a child scope with its
//! own slots and effect sites. A scope's children live until its next
//! re-invocation: writing a parent slot drops every child subtree before the
//! parent body replays, and a child re-created by the replay starts from
//! scratch. Setters bound to a dropped scope stay callable but their writes
//! are ignored.
//!
//! ## Call-order stability
//!
//! The pairing is positional, so a body must declare the same state and the
//! same effects, in the same order, on every invocation. Breaking that is
//! reported instead of tolerated: [`RuntimeError::SlotTypeMismatch`],
//! [`RuntimeError::SlotCountMismatch`], [`RuntimeError::EffectCountMismatch`]
//! and [`RuntimeError::EffectArityMismatch`] all mean the body's declaration
//! sequence changed between invocations.
//!
//! A setter fired while its scope's body is still running (typically from an
//! effect body) nests the whole re-invocation synchronously and then lets
//! the interrupted body resume. The resumed body's cursors are already fully
//! consumed, so it must not declare anything further; if it does, the count
//! checks above report it. When the write replaced an ancestor's slot
//! instead, the resumed body's own scope is gone, and any further
//! declaration, nested [`Runtime::enter`] included, reports
//! [`RuntimeError::NoActiveScope`].

pub mod effects;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod state;

pub use effects::*;
pub use error::*;
pub use runtime::*;
pub use scope::*;
pub use state::*;
