use bitfield_struct::bitfield;

/// Physical ports a frame is addressed to.
#[bitfield(u8)]
#[derive(PartialEq, Eq, Hash)]
pub struct PortMask {
    /// Switch port 0.
    pub port0: bool,

    /// Switch port 1.
    pub port1: bool,

    #[bits(6)]
    __reserved: u8,
}

impl PortMask {
    /// Both switch ports.
    pub const BOTH: Self = Self::new().with_port0(true).with_port1(true);

    /// The mask selecting only `port`, or `None` for a port the switch does
    /// not have.
    #[must_use]
    pub const fn single(port: u8) -> Option<Self> {
        match port {
            0 => Some(Self::new().with_port0(true)),
            1 => Some(Self::new().with_port1(true)),
            _ => None,
        }
    }

    /// The port index if exactly one port is selected.
    #[must_use]
    pub const fn single_port(self) -> Option<u8> {
        match (self.port0(), self.port1()) {
            (true, false) => Some(0),
            (false, true) => Some(1),
            _ => None,
        }
    }

    /// Where the driver should send a frame for this mask.
    #[must_use]
    pub const fn target(self) -> TxTarget {
        match self.single_port() {
            Some(port) => TxTarget::Port(port),
            None => TxTarget::Flood,
        }
    }
}

/// Transmit destination understood by the switch driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TxTarget {
    /// Egress on exactly one port.
    Port(u8),
    /// Let the switch forward to every port.
    Flood,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_port_masks_target_that_port() {
        assert_eq!(PortMask::single(0).map(PortMask::target), Some(TxTarget::Port(0)));
        assert_eq!(PortMask::single(1).map(PortMask::target), Some(TxTarget::Port(1)));
        assert_eq!(PortMask::single(2), None);
    }

    #[test]
    fn anything_else_floods() {
        assert_eq!(PortMask::BOTH.target(), TxTarget::Flood);
        assert_eq!(PortMask::new().target(), TxTarget::Flood);
        assert_eq!(PortMask::from_bits(0b0000_0011), PortMask::BOTH);
    }
}
