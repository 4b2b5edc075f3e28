//! Channel groups: which channels mirror each other.

use std::collections::HashMap;

use tracing::warn;

use crate::base::{error::ConfigError, types::Channel};

/// Symmetric channel → group lookup.
///
/// Groups live in an arena and every member maps to its group's index, so
/// every member of a group sees the same peer list.
#[derive(Debug, Default, Clone)]
pub struct ChannelGroupTable {
    groups: Vec<Vec<Channel>>,
    index: HashMap<Channel, usize>,
}

impl ChannelGroupTable {
    /// Build the table from groups of channels.
    ///
    /// A channel may belong to at most one group, and may appear in it only once.
    pub fn new(groups: Vec<Vec<Channel>>) -> Result<Self, ConfigError> {
        let mut index = HashMap::with_capacity(groups.iter().map(Vec::len).sum());

        for (position, group) in groups.iter().enumerate() {
            if group.len() < 2 {
                warn!("Channel group {:?} has fewer than two channels and will never forward.", group);
            }

            for channel in group {
                if index.insert(channel.clone(), position).is_some() {
                    return Err(ConfigError::DuplicateChannel(channel.clone()));
                }
            }
        }

        Ok(Self { groups, index })
    }

    /// Parse `TID/CID:TID/CID,...`, one group per comma-separated entry.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let groups = s
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.split(':').map(str::parse).collect::<Result<Vec<Channel>, _>>())
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(groups)
    }

    /// Every channel in `channel`'s group, `channel` included.
    ///
    /// Empty for a channel that belongs to no group.
    pub fn peers_of(&self, channel: &Channel) -> &[Channel] {
        self.index.get(channel).map(|&position| self.groups[position].as_slice()).unwrap_or_default()
    }

    /// How many groups are configured.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// All grouped channels, in no particular order.
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.index.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(s: &str) -> Channel {
        s.parse().unwrap()
    }

    #[test]
    fn ungrouped_channel_has_no_peers() {
        let table = ChannelGroupTable::parse("T1/C1:T2/C2").unwrap();

        assert!(table.peers_of(&ch("T3/C3")).is_empty());
        assert!(ChannelGroupTable::default().peers_of(&ch("T1/C1")).is_empty());
    }

    #[test]
    fn every_member_sees_the_whole_group() {
        let table = ChannelGroupTable::parse("T1/C1:T2/C2:T3/C3,T1/C9:T2/C9").unwrap();
        let expected = vec![ch("T1/C1"), ch("T2/C2"), ch("T3/C3")];

        for member in &expected {
            assert_eq!(table.peers_of(member), expected.as_slice());
        }

        assert_eq!(table.peers_of(&ch("T2/C9")), &[ch("T1/C9"), ch("T2/C9")]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn members_share_one_group_record() {
        let table = ChannelGroupTable::parse("T1/C1:T2/C2").unwrap();

        assert!(std::ptr::eq(table.peers_of(&ch("T1/C1")), table.peers_of(&ch("T2/C2"))));
    }

    #[test]
    fn channel_in_two_groups_is_fatal() {
        let err = ChannelGroupTable::parse("T1/C1:T2/C2,T3/C3:T1/C1").unwrap_err();

        assert_eq!(err, ConfigError::DuplicateChannel(ch("T1/C1")));
    }

    #[test]
    fn channel_twice_in_one_group_is_fatal() {
        let err = ChannelGroupTable::new(vec![vec![ch("T1/C1"), ch("T2/C2"), ch("T1/C1")]]).unwrap_err();

        assert_eq!(err, ConfigError::DuplicateChannel(ch("T1/C1")));
    }

    #[test]
    fn malformed_channel_is_fatal() {
        assert!(matches!(ChannelGroupTable::parse("T1/C1:T2"), Err(ConfigError::MalformedChannel(_))));
    }

    #[test]
    fn blank_entries_are_skipped() {
        let table = ChannelGroupTable::parse(" T1/C1:T2/C2 , ,").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.channels().count(), 2);
    }
}
