//! # Core Buffers
//!
//! The navigation model of the player. Everything the user browses lives in
//! a buffer: a named list of items with a cursor. Buffers are kept in a
//! [`BufferListCollection`] that the user cycles through; one of them, the
//! play queue, is permanent.
//!
//! ## Example
//!
//! ```
//! use core_buffers::{BufferItem, BufferList, BufferListCollection, Navigation};
//!
//! let mut buffers = BufferListCollection::new(BufferList::new("Play Queue", false));
//! let results = BufferList::new("Search for: blue", true)
//!     .with_items([BufferItem::text("first"), BufferItem::text("second")]);
//! let id = buffers.add(results);
//! buffers.set_current(id);
//!
//! let list = buffers.current_list_mut();
//! assert_eq!(list.next_item(), Navigation::Moved(1));
//! assert_eq!(list.next_item(), Navigation::Boundary);
//! ```

pub mod buffer_list;
pub mod collection;
pub mod error;
pub mod item;
pub mod models;

pub use buffer_list::{BufferId, BufferList, Navigation};
pub use collection::BufferListCollection;
pub use error::{BufferError, Result};
pub use item::{BufferItem, SearchHit};
pub use models::{format_duration, Playlist, PlaylistId, Track, TrackId};
