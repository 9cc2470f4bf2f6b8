use crate::LeadId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales lead as stored.
///
/// `estimated_commission` is derived from `estimated_sale_amount` and
/// `status` by the service and is never taken from a caller. `version`,
/// `created_at` and `updated_at` are maintained by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub status: String,
    pub estimated_sale_amount: i64,
    pub estimated_commission: i64,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated lead ready to be inserted, with its ID and commission already
/// assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub status: String,
    pub estimated_sale_amount: i64,
    pub estimated_commission: i64,
}

/// A validated partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
    pub estimated_sale_amount: Option<i64>,
    pub estimated_commission: Option<i64>,
    /// Apply the update only if the stored lead still has this version.
    pub expected_version: Option<u64>,
}

impl LeadUpdate {
    /// Returns `true` if the update changes an input of the commission.
    pub fn touches_commission_inputs(&self) -> bool {
        self.estimated_sale_amount.is_some() || self.status.is_some()
    }

    /// Returns `true` if the update carries no field at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.status.is_none()
            && self.estimated_sale_amount.is_none()
            && self.estimated_commission.is_none()
    }
}

impl Lead {
    /// Builds the stored form of a new lead, stamped with `now`.
    pub fn from_new(new: NewLead, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id,
            name: new.name,
            email: new.email,
            status: new.status,
            estimated_sale_amount: new.estimated_sale_amount,
            estimated_commission: new.estimated_commission,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the fields of `update` and reports whether anything changed.
    ///
    /// `version` and `updated_at` only move when at least one field actually
    /// takes a new value. `expected_version` is not checked here.
    pub fn apply(&mut self, update: &LeadUpdate, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        changed |= replace(&mut self.name, update.name.as_ref());
        changed |= replace(&mut self.email, update.email.as_ref());
        changed |= replace(&mut self.status, update.status.as_ref());
        changed |= replace(
            &mut self.estimated_sale_amount,
            update.estimated_sale_amount.as_ref(),
        );
        changed |= replace(
            &mut self.estimated_commission,
            update.estimated_commission.as_ref(),
        );

        if changed {
            self.version += 1;
            self.updated_at = now;
        }
        changed
    }
}

fn replace<T: PartialEq + Clone>(field: &mut T, value: Option<&T>) -> bool {
    match value {
        Some(value) if field != value => {
            field.clone_from(value);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lead() -> Lead {
        Lead::from_new(
            NewLead {
                id: LeadId::new(1),
                name: "Ada".into(),
                email: "ada@example.com".into(),
                status: "qualified".into(),
                estimated_sale_amount: 1000,
                estimated_commission: 50,
            },
            Utc::now(),
        )
    }

    #[test]
    fn apply_bumps_version_on_change() {
        let mut lead = lead();
        let later = lead.updated_at + Duration::seconds(1);
        let update = LeadUpdate {
            name: Some("Ada L.".into()),
            ..LeadUpdate::default()
        };

        assert!(lead.apply(&update, later));
        assert_eq!(lead.name, "Ada L.");
        assert_eq!(lead.version, 1);
        assert_eq!(lead.updated_at, later);
    }

    #[test]
    fn apply_without_changes_is_a_no_op() {
        let mut lead = lead();
        let before = lead.clone();
        let update = LeadUpdate {
            name: Some("Ada".into()),
            estimated_sale_amount: Some(1000),
            ..LeadUpdate::default()
        };

        assert!(!lead.apply(&update, Utc::now() + Duration::seconds(5)));
        assert_eq!(lead, before);
    }

    #[test]
    fn commission_inputs_are_amount_and_status() {
        assert!(!LeadUpdate::default().touches_commission_inputs());
        assert!(
            LeadUpdate {
                status: Some("unqualified".into()),
                ..LeadUpdate::default()
            }
            .touches_commission_inputs()
        );
        assert!(
            !LeadUpdate {
                email: Some("x@y.io".into()),
                ..LeadUpdate::default()
            }
            .touches_commission_inputs()
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let value = serde_json::to_value(lead()).unwrap();
        assert_eq!(value["id"], 1);
        assert_eq!(value["estimatedSaleAmount"], 1000);
        assert_eq!(value["estimatedCommission"], 50);
        assert!(value.get("createdAt").is_some());
    }
}
