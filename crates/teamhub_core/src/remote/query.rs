//! Table catalog and query descriptions understood by every remote store.

use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Remote tables mirrored by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Teams,
    TeamMembers,
    Projects,
    Tasks,
    Messages,
    Ratings,
    ProjectJoinRequests,
}

impl Table {
    pub const ALL: [Table; 8] = [
        Table::Profiles,
        Table::Teams,
        Table::TeamMembers,
        Table::Projects,
        Table::Tasks,
        Table::Messages,
        Table::Ratings,
        Table::ProjectJoinRequests,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Teams => "teams",
            Self::TeamMembers => "team_members",
            Self::Projects => "projects",
            Self::Tasks => "tasks",
            Self::Messages => "messages",
            Self::Ratings => "ratings",
            Self::ProjectJoinRequests => "project_join_requests",
        }
    }

    /// Columns in declaration order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Profiles => &[
                "id",
                "username",
                "bio",
                "avatar_url",
                "created_at",
                "updated_at",
            ],
            Self::Teams => &["id", "name", "created_by", "created_at"],
            Self::TeamMembers => &["id", "team_id", "user_id", "role", "joined_at"],
            Self::Projects => &[
                "id",
                "name",
                "description",
                "status",
                "owner_id",
                "team_id",
                "created_at",
                "updated_at",
            ],
            Self::Tasks => &[
                "id",
                "title",
                "description",
                "status",
                "priority",
                "project_id",
                "assigned_to",
                "created_by",
                "due_date",
                "created_at",
                "updated_at",
            ],
            Self::Messages => &["id", "content", "sender_id", "team_id", "created_at"],
            Self::Ratings => &[
                "id",
                "rater_id",
                "rated_user_id",
                "rating",
                "comment",
                "project_id",
                "created_at",
            ],
            Self::ProjectJoinRequests => &[
                "id",
                "project_id",
                "user_id",
                "status",
                "message",
                "created_at",
            ],
        }
    }

    pub fn has_column(self, column: &str) -> bool {
        self.columns().contains(&column)
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Row predicate applied by the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Neq(&'static str, Value),
    In(&'static str, Vec<Value>),
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Eq(column, _) | Self::Neq(column, _) | Self::In(column, _) => column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// Select query over one table.
///
/// ```
/// use teamhub_core::remote::{Direction, Query, Table};
///
/// let query = Query::table(Table::Tasks)
///     .eq("status", "todo")
///     .order_by("created_at", Direction::Descending);
/// assert_eq!(query.filters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn table(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
        }
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(column, value.into()));
        self
    }

    pub fn neq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Neq(column, value.into()));
        self
    }

    pub fn is_in<V: Into<Value>>(
        mut self,
        column: &'static str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filters.push(Filter::In(column, values));
        self
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order = Some(Order { column, direction });
        self
    }
}

/// Shorthand for a single equality filter used by updates and deletes.
pub fn eq_filter(column: &'static str, value: impl Into<Value>) -> Vec<Filter> {
    vec![Filter::Eq(column, value.into())]
}
