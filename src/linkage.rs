//! Corporate linkage: the levels above an entity in its family tree.

use crate::address::{address_labels, address_values, simple_address_labels, simple_address_values, AddrComponent};
use crate::cell::Cell;
use crate::header::Label;
use crate::models::{LinkageMember, Organization};

/// D&B family tree role code of a global ultimate.
pub const GLOBAL_ULTIMATE_ROLE: i64 = 12775;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageLevel {
    /// Headquarter, or parent when there is no headquarter.
    OneLevelUp,
    DomesticUltimate,
    GlobalUltimate,
}

impl LinkageLevel {
    pub const ALL: [LinkageLevel; 3] = [
        LinkageLevel::OneLevelUp,
        LinkageLevel::DomesticUltimate,
        LinkageLevel::GlobalUltimate,
    ];

    /// Column label prefix of the level.
    pub fn desc(self) -> &'static str {
        match self {
            LinkageLevel::OneLevelUp => "immed parent",
            LinkageLevel::DomesticUltimate => "dom ult",
            LinkageLevel::GlobalUltimate => "global ult",
        }
    }

    pub fn label(self) -> Label {
        Label::group().with_prefix(self.desc())
    }
}

/// Which member filled the one-level-up slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneLevelUpKind {
    HeadQuarter,
    Parent,
}

impl OneLevelUpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OneLevelUpKind::HeadQuarter => "HQ",
            OneLevelUpKind::Parent => "Parent",
        }
    }
}

/// The up to three levels above an entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkageLevels<'a> {
    pub one_level_up: Option<(OneLevelUpKind, &'a LinkageMember)>,
    pub domestic_ultimate: Option<&'a LinkageMember>,
    pub global_ultimate: Option<&'a LinkageMember>,
}

impl<'a> LinkageLevels<'a> {
    pub fn get(&self, level: LinkageLevel) -> Option<&'a LinkageMember> {
        match level {
            LinkageLevel::OneLevelUp => self.one_level_up.map(|(_, member)| member),
            LinkageLevel::DomesticUltimate => self.domestic_ultimate,
            LinkageLevel::GlobalUltimate => self.global_ultimate,
        }
    }

    /// One level up, domestic ultimate and global ultimate, in that order.
    pub fn as_array(&self) -> [Option<&'a LinkageMember>; 3] {
        LinkageLevel::ALL.map(|level| self.get(level))
    }

    pub fn one_level_up_kind(&self) -> Option<OneLevelUpKind> {
        self.one_level_up.map(|(kind, _)| kind)
    }
}

/// Resolves the linkage levels of `org`. The headquarter takes the
/// one-level-up slot when present, the parent otherwise.
pub fn resolve_levels(org: &Organization) -> LinkageLevels<'_> {
    let Some(linkage) = org.corporate_linkage.as_ref() else {
        return LinkageLevels::default();
    };

    let one_level_up = linkage
        .head_quarter
        .as_ref()
        .map(|hq| (OneLevelUpKind::HeadQuarter, hq))
        .or_else(|| {
            linkage
                .parent
                .as_ref()
                .map(|parent| (OneLevelUpKind::Parent, parent))
        });

    LinkageLevels {
        one_level_up,
        domestic_ultimate: linkage.domestic_ultimate.as_ref(),
        global_ultimate: linkage.global_ultimate.as_ref(),
    }
}

/// `Some(true)` when the entity plays the global ultimate role, `None`
/// when the document carries no linkage at all.
pub fn is_global_ultimate(org: &Organization) -> Option<bool> {
    let linkage = org.corporate_linkage.as_ref()?;

    Some(
        linkage
            .familytree_roles_played
            .iter()
            .any(|role| role.dnb_code == Some(GLOBAL_ULTIMATE_ROLE)),
    )
}

/// Descriptions of the family tree roles, comma separated.
pub fn family_tree_roles(org: &Organization) -> Option<String> {
    let roles = &org.corporate_linkage.as_ref()?.familytree_roles_played;
    if roles.is_empty() {
        return None;
    }

    Some(
        roles
            .iter()
            .filter_map(|role| role.description.as_deref())
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkageComponent {
    Duns,
    Name,
}

impl LinkageComponent {
    pub fn desc(self) -> &'static str {
        match self {
            LinkageComponent::Duns => "duns",
            LinkageComponent::Name => "name",
        }
    }

    fn value(self, member: &LinkageMember) -> Cell {
        match self {
            LinkageComponent::Duns => member.duns.as_ref().into(),
            LinkageComponent::Name => member.primary_name.as_ref().into(),
        }
    }
}

/// Scalars of one level followed by its flattened primary address.
pub fn linkage_level_values(
    member: Option<&LinkageMember>,
    components: &[LinkageComponent],
    addr_components: &[AddrComponent],
) -> Vec<Cell> {
    let Some(member) = member else {
        return Cell::nulls(components.len() + addr_components.len());
    };

    let mut cells: Vec<Cell> = components.iter().map(|c| c.value(member)).collect();
    cells.extend(address_values(member.primary_address.as_ref(), addr_components));

    cells
}

pub fn linkage_level_labels(
    components: &[LinkageComponent],
    addr_components: &[AddrComponent],
    base: &Label,
) -> Vec<String> {
    let mut labels: Vec<String> = components
        .iter()
        .map(|c| base.render(c.desc(), None))
        .collect();
    labels.extend(address_labels(addr_components, base));

    labels
}

/// DUNS, name and simplified address of one level.
pub fn simple_linkage_level_values(member: Option<&LinkageMember>) -> Vec<Cell> {
    let mut cells = vec![
        member.and_then(|m| m.duns.as_ref()).into(),
        member.and_then(|m| m.primary_name.as_ref()).into(),
    ];
    cells.extend(simple_address_values(
        member.and_then(|m| m.primary_address.as_ref()),
    ));

    cells
}

pub fn simple_linkage_level_labels(base: &Label) -> Vec<String> {
    let mut labels = vec![
        base.render(LinkageComponent::Duns.desc(), None),
        base.render(LinkageComponent::Name.desc(), None),
    ];
    labels.extend(simple_address_labels(base));

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn org(value: serde_json::Value) -> Organization {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_headquarter_wins_over_parent() {
        let org = org(json!({"corporateLinkage": {
            "headQuarter": {"duns": "111111111"},
            "parent": {"duns": "222222222"}
        }}));
        let levels = resolve_levels(&org);
        assert_eq!(levels.one_level_up_kind(), Some(OneLevelUpKind::HeadQuarter));
        assert_eq!(
            levels.get(LinkageLevel::OneLevelUp).and_then(|m| m.duns.as_deref()),
            Some("111111111")
        );
    }

    #[test]
    fn test_parent_when_headquarter_empty() {
        let org = org(json!({"corporateLinkage": {
            "headQuarter": {},
            "parent": {"duns": "222222222"}
        }}));
        let levels = resolve_levels(&org);
        assert_eq!(levels.one_level_up_kind(), Some(OneLevelUpKind::Parent));
    }

    #[test]
    fn test_no_linkage() {
        let org = org(json!({"corporateLinkage": {}}));
        assert!(resolve_levels(&org).as_array().iter().all(Option::is_none));
        assert_eq!(is_global_ultimate(&org), None);
        assert_eq!(family_tree_roles(&org), None);
    }

    #[test]
    fn test_global_ultimate_flag() {
        let gu = org(json!({"corporateLinkage": {"familytreeRolesPlayed": [
            {"description": "Parent/Headquarters", "dnbCode": 12773},
            {"description": "Global Ultimate", "dnbCode": 12775}
        ]}}));
        assert_eq!(is_global_ultimate(&gu), Some(true));
        assert_eq!(
            family_tree_roles(&gu).as_deref(),
            Some("Parent/Headquarters,Global Ultimate")
        );

        let sub = org(json!({"corporateLinkage": {"familytreeRolesPlayed": [
            {"description": "Subsidiary", "dnbCode": 9159}
        ]}}));
        assert_eq!(is_global_ultimate(&sub), Some(false));
    }

    #[test]
    fn test_level_values_and_labels_line_up() {
        let org = org(json!({"corporateLinkage": {"globalUltimate": {
            "duns": "333333333",
            "primaryName": "Acme Holding",
            "primaryAddress": {"addressCountry": {"isoAlpha2Code": "US"}}
        }}}));
        let levels = resolve_levels(&org);
        let components = [LinkageComponent::Duns, LinkageComponent::Name];
        let addr = [AddrComponent::Line1, AddrComponent::CountryIso];

        let cells = linkage_level_values(levels.global_ultimate, &components, &addr);
        assert_eq!(
            cells,
            vec![
                Cell::from("333333333"),
                Cell::from("Acme Holding"),
                Cell::Null,
                Cell::from("US")
            ]
        );

        let labels = linkage_level_labels(&components, &addr, &LinkageLevel::GlobalUltimate.label());
        assert_eq!(
            labels,
            vec![
                "global ult duns",
                "global ult name",
                "global ult addr line 1",
                "global ult country ISO"
            ]
        );

        let empty = linkage_level_values(levels.domestic_ultimate, &components, &addr);
        assert_eq!(empty, Cell::nulls(4));
    }
}
