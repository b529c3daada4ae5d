use bitflags::bitflags;

bitflags! {
    /// Discord permission bitset.
    ///
    /// Only the flags the bot reasons about are named; unknown bits from the
    /// platform are retained so round-tripping never loses information.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u64 {
        const CREATE_INSTANT_INVITE = 1 << 0;
        const KICK_MEMBERS = 1 << 1;
        const BAN_MEMBERS = 1 << 2;
        const ADMINISTRATOR = 1 << 3;
        const MANAGE_CHANNELS = 1 << 4;
        const MANAGE_GUILD = 1 << 5;
        const SEND_MESSAGES = 1 << 11;
        const MANAGE_MESSAGES = 1 << 13;
        const MENTION_EVERYONE = 1 << 17;
        const MANAGE_ROLES = 1 << 28;

        const _ = !0;
    }
}

impl Permissions {
    /// Parse the decimal string Discord uses on the wire.
    pub fn from_wire(value: &str) -> Option<Self> {
        value.trim().parse::<u64>().ok().map(Self::from_bits_retain)
    }

    pub fn to_wire(self) -> String {
        self.bits().to_string()
    }
}
