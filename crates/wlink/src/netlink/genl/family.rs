//! Controller family records (`CTRL_CMD_NEWFAMILY`).

use super::{CtrlAttr, CtrlAttrMcastGrp, CtrlAttrOp};
use crate::netlink::codec::{AttrRecord, AttrValue, Codec, FieldSpec, Fields};
use crate::netlink::error::AttributeError;

/// One operation a family supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Command number.
    pub id: u32,
    /// `GENL_*` permission flags.
    pub flags: u32,
}

impl AttrRecord for Operation {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", CtrlAttrOp::Id as u16, Codec::U32),
        FieldSpec::new("flags", CtrlAttrOp::Flags as u16, Codec::U32),
    ];

    fn from_fields(fields: &Fields) -> Result<Self, AttributeError> {
        Ok(Self {
            id: fields.u32("id")?,
            flags: fields.opt_u32("flags")?.unwrap_or(0),
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("id", AttrValue::U32(self.id))
            .with("flags", AttrValue::U32(self.flags))
    }
}

/// A multicast group a family exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McastGroup {
    pub name: String,
    pub id: u32,
}

impl AttrRecord for McastGroup {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("name", CtrlAttrMcastGrp::Name as u16, Codec::Str),
        FieldSpec::new("id", CtrlAttrMcastGrp::Id as u16, Codec::U32),
    ];

    fn from_fields(fields: &Fields) -> Result<Self, AttributeError> {
        Ok(Self {
            name: fields.str("name")?.to_owned(),
            id: fields.u32("id")?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("name", AttrValue::Str(self.name.clone()))
            .with("id", AttrValue::U32(self.id))
    }
}

const OPERATION: Codec = Codec::Record(Operation::FIELDS);
const MCAST_GROUP: Codec = Codec::Record(McastGroup::FIELDS);

/// A resolved Generic Netlink family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyController {
    /// Dynamically assigned family ID (used as `nlmsg_type`).
    pub id: u16,
    pub name: String,
    pub version: u32,
    /// Bytes of family-specific header after `genlmsghdr`.
    pub hdr_size: u32,
    pub max_attr: u32,
    /// Supported operations, in kernel order.
    pub operations: Vec<Operation>,
    /// Multicast groups, in kernel order.
    pub mcast_groups: Vec<McastGroup>,
}

impl FamilyController {
    /// Look up a multicast group ID by name.
    pub fn mcast_group(&self, name: &str) -> Option<u32> {
        self.mcast_groups
            .iter()
            .find(|g| g.name == name)
            .map(|g| g.id)
    }

    /// Whether the family advertises command `cmd`.
    pub fn supports(&self, cmd: u8) -> bool {
        self.operations.iter().any(|op| op.id == u32::from(cmd))
    }
}

impl AttrRecord for FamilyController {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::new("id", CtrlAttr::FamilyId as u16, Codec::U16),
        FieldSpec::new("name", CtrlAttr::FamilyName as u16, Codec::Str),
        FieldSpec::new("version", CtrlAttr::Version as u16, Codec::U32),
        FieldSpec::new("hdr_size", CtrlAttr::HdrSize as u16, Codec::U32),
        FieldSpec::new("max_attr", CtrlAttr::MaxAttr as u16, Codec::U32),
        FieldSpec::new("operations", CtrlAttr::Ops as u16, Codec::Array(&OPERATION)),
        FieldSpec::new(
            "mcast_groups",
            CtrlAttr::McastGroups as u16,
            Codec::Array(&MCAST_GROUP),
        ),
    ];

    fn from_fields(fields: &Fields) -> Result<Self, AttributeError> {
        Ok(Self {
            id: fields.u16("id")?,
            name: fields.str("name")?.to_owned(),
            version: fields.opt_u32("version")?.unwrap_or(0),
            hdr_size: fields.opt_u32("hdr_size")?.unwrap_or(0),
            max_attr: fields.opt_u32("max_attr")?.unwrap_or(0),
            operations: fields.opt_records("operations")?,
            mcast_groups: fields.opt_records("mcast_groups")?,
        })
    }

    fn to_fields(&self) -> Fields {
        let ops = self
            .operations
            .iter()
            .map(|op| AttrValue::Record(op.to_fields()))
            .collect();
        let groups = self
            .mcast_groups
            .iter()
            .map(|g| AttrValue::Record(g.to_fields()))
            .collect();
        Fields::new()
            .with("id", AttrValue::U16(self.id))
            .with("name", AttrValue::Str(self.name.clone()))
            .with("version", AttrValue::U32(self.version))
            .with("hdr_size", AttrValue::U32(self.hdr_size))
            .with("max_attr", AttrValue::U32(self.max_attr))
            .with("operations", AttrValue::Array(ops))
            .with("mcast_groups", AttrValue::Array(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::attr;
    use crate::netlink::fixtures::nl80211_family;

    #[test]
    fn test_family_roundtrip() {
        let family = nl80211_family();
        let encoded = family.encode().unwrap();
        assert_eq!(FamilyController::decode(&encoded).unwrap(), family);
    }

    #[test]
    fn test_mcast_lookup() {
        let family = nl80211_family();
        assert_eq!(family.mcast_group("scan"), Some(5));
        assert_eq!(family.mcast_group("nan"), None);
        assert!(family.supports(33));
        assert!(!family.supports(34));
    }

    #[test]
    fn test_missing_family_id() {
        let mut buf = Vec::new();
        attr::put(&mut buf, CtrlAttr::FamilyName as u16, b"nl80211\0").unwrap();
        assert_eq!(
            FamilyController::decode(&buf),
            Err(AttributeError::FieldNotFound("id"))
        );
    }

    #[test]
    fn test_minimal_reply() {
        let mut buf = Vec::new();
        attr::put(&mut buf, CtrlAttr::FamilyName as u16, b"acpi_event\0").unwrap();
        attr::put(&mut buf, CtrlAttr::FamilyId as u16, &0x17u16.to_ne_bytes()).unwrap();
        // CTRL_ATTR_POLICY is not modelled
        attr::put(&mut buf, 8, &[0; 8]).unwrap();
        let family = FamilyController::decode(&buf).unwrap();
        assert_eq!(family.id, 0x17);
        assert_eq!(family.name, "acpi_event");
        assert!(family.operations.is_empty());
        assert!(family.mcast_groups.is_empty());
    }
}
