#![forbid(unsafe_code)]

//! zonekit public facade.
//!
//! Wires the input layer (`zonekit-core`), the command kernel
//! (`zonekit-runtime`), and the zone model (`zonekit-zones`) into one
//! [`Interaction`] that hosts feed key, pointer, and native clipboard events.
//!
//! ```
//! use zonekit::prelude::*;
//!
//! # fn main() -> zonekit::Result<()> {
//! let mut ui = Interaction::headless()?;
//! let rows = Collection::from_entities(["a", "b", "c"].map(|id| Entity::new(id, "row")))?;
//! ui.register_collection(CollectionConfig::new("rows"), Role::Listbox, rows);
//!
//! ui.handle_key(&KeyEvent::new(KeyCode::Down), &FocusTarget::zone("rows"));
//! assert_eq!(ui.zone_state(&ZoneId::from("rows")).focused, Some(ItemId::from("b")));
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod error;
pub mod interaction;
pub mod keymap;
pub mod state;

pub use command::{Command, CustomCommand};
pub use error::{Error, Result};
pub use interaction::{AppHandler, AppZone, Env, Interaction, KeyOutcome};
pub use keymap::{default_bindings, install_default_keymap};
pub use state::{AppState, Collections};

pub use zonekit_core as core;
pub use zonekit_runtime as runtime;
pub use zonekit_zones as zones;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{AppHandler, AppState, AppZone, Command, CustomCommand, Error, Interaction, KeyOutcome, Result};

    pub use zonekit_core::{
        Binding, BindingContext, FieldConfig, FocusTarget, KeyCode, KeyEvent, Modifiers, NativeAction, Platform,
        PointerEvent,
    };
    pub use zonekit_runtime::{DispatchResult, Handler, KernelConfig, MemoryClipboard, Rejection, Transition};
    pub use zonekit_zones::{
        Collection, CollectionConfig, Direction, Entity, EntityTree, InsertAt, ItemId, Role, SelectConfig, SelectOp,
        ZoneAction, ZoneConfig, ZoneId,
    };

    pub use crate::{core, runtime, zones};
}
