//! Message registry and factory.
//!
//! Each node owns one factory, fills it at start-up with constructors for
//! the message ids it expects to *receive* (outbound-only variants need no
//! entry), and then uses it for every inbound id. Lookup is a plain array
//! index. Ids without an entry come back as the node's unknown-message
//! fallback, which is also how genuinely unknown ids are handled, so an
//! under-registered node degrades to error reports rather than stream
//! corruption.

use crate::error::{make_shared_error_id, CarrtError, ErrorKind, ErrorModule};
use crate::id::MsgId;

/// Constructs one message for the given id. The constructor must verify the
/// id matches the variant it builds.
pub type MessageCreator<M> = fn(MsgId) -> Result<M, CarrtError>;

/// Id-indexed constructor table, generic over the node's message type
/// (typically a boxed node-message trait object).
pub struct MessageFactory<M> {
	creators: [Option<MessageCreator<M>>; MsgId::COUNT],
	unknown: fn(u8) -> M,
}

impl<M> MessageFactory<M> {
	/// An empty factory. `unknown` builds the node's stand-in for an
	/// unrecognized or unregistered id.
	pub fn new(unknown: fn(u8) -> M) -> Self {
		Self {
			creators: [None; MsgId::COUNT],
			unknown,
		}
	}

	/// Maps an id to its constructor. Exactly one mapping per id is
	/// allowed; a second registration is a hard error because a silently
	/// replaced constructor would corrupt the inbound stream from that
	/// point on.
	pub fn register(
		&mut self,
		id: MsgId,
		creator: MessageCreator<M>,
	) -> Result<(), CarrtError> {
		let idx = u8::from(id) as usize;
		if id == MsgId::Unknown || idx >= MsgId::COUNT {
			return Err(CarrtError::new(
				make_shared_error_id(ErrorModule::SerialMessage, 4, u8::from(id).into()),
				ErrorKind::UnknownMessageId(id.into()),
			));
		}
		if self.creators[idx].is_some() {
			return Err(CarrtError::new(
				make_shared_error_id(ErrorModule::SerialMessage, 4, idx as i32),
				ErrorKind::DuplicateRegistration(id.into()),
			));
		}
		self.creators[idx] = Some(creator);
		Ok(())
	}

	/// Builds the message for an id byte just pulled off the link.
	pub fn create(&self, raw_id: u8) -> Result<M, CarrtError> {
		if let Ok(id) = MsgId::try_from(raw_id) {
			if id != MsgId::Unknown {
				if let Some(creator) = self.creators[u8::from(id) as usize] {
					return creator(id);
				}
			}
		}
		Ok((self.unknown)(raw_id))
	}

	/// True if the id has a registered constructor.
	pub fn is_registered(&self, id: MsgId) -> bool {
		let idx = u8::from(id) as usize;
		idx < MsgId::COUNT && self.creators[idx].is_some()
	}
}
