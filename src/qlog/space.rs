//! Packet number space
//!
//! QUIC 的三个独立编号空间；同一数值在不同 space 中互不相关。

use std::fmt;
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PacketSpace {
    Initial,
    Handshake,
    OneRtt,
}

impl PacketSpace {
    pub const ALL: [PacketSpace; 3] = [
        PacketSpace::Initial,
        PacketSpace::Handshake,
        PacketSpace::OneRtt,
    ];

    fn slot(self) -> usize {
        match self {
            Self::Initial => 0,
            Self::Handshake => 1,
            Self::OneRtt => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Handshake => "handshake",
            Self::OneRtt => "one_rtt",
        }
    }
}

impl fmt::Display for PacketSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 每个 space 一份独立状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerSpace<T> {
    slots: [T; 3],
}

impl<T> PerSpace<T> {
    pub fn iter(&self) -> impl Iterator<Item = (PacketSpace, &T)> {
        PacketSpace::ALL.into_iter().zip(self.slots.iter())
    }
}

impl<T> Index<PacketSpace> for PerSpace<T> {
    type Output = T;

    fn index(&self, space: PacketSpace) -> &T {
        &self.slots[space.slot()]
    }
}

impl<T> IndexMut<PacketSpace> for PerSpace<T> {
    fn index_mut(&mut self, space: PacketSpace) -> &mut T {
        &mut self.slots[space.slot()]
    }
}
