//! SeaORM entities for database tables

use sea_orm::entity::prelude::*;

/// Activity table entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "activity")]
pub struct Model {
    /// Auto-assigned identifier
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Event name
    pub title: String,

    /// Free-form description
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Venue
    pub location: Option<String>,

    /// Event start
    pub start_time: DateTimeUtc,

    /// Event end
    pub end_time: DateTimeUtc,

    /// Participant cap; NULL means unlimited
    pub max_participants: Option<i32>,

    /// Registration cut-off; NULL means open until start
    pub registration_deadline: Option<DateTimeUtc>,

    /// Fee per participant
    pub fee_amount: Decimal,

    /// Category, stored as its canonical string form
    pub activity_type: String,

    /// Audience, stored as its canonical string form
    pub target_audience: String,

    /// Lifecycle state, stored as its canonical string form
    pub status: String,

    /// Requested (while Scheduled) or actual (once Published) publish time
    pub publish_at: Option<DateTimeUtc>,

    /// Creating user
    pub created_by: String,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One-to-many relationship with registrations
    #[sea_orm(has_many = "registration::Entity")]
    Registrations,
}

impl Related<registration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Registration table module
pub mod registration {
    use sea_orm::entity::prelude::*;

    /// Registration table entity
    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "activity_registration")]
    pub struct Model {
        /// Auto-assigned identifier
        #[sea_orm(primary_key)]
        pub id: i64,

        /// Owning activity
        pub activity_id: i64,

        /// Registered member
        pub user_id: String,

        /// Lifecycle state, stored as its canonical string form
        pub status: String,

        /// Payment sub-state, stored as its canonical string form
        pub payment_status: String,

        /// Fee frozen at registration time
        pub payment_amount: Decimal,

        /// When the member registered
        pub registration_time: DateTimeUtc,

        /// Free-form note
        pub note: Option<String>,

        /// Whether the member has checked in
        pub checked_in: bool,

        /// When the member checked in
        pub check_in_time: Option<DateTimeUtc>,

        /// Whether check-in was past the grace window
        pub is_late: Option<bool>,

        /// Creation timestamp
        pub created_at: DateTimeUtc,

        /// Last update timestamp
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        /// Foreign key to the owning activity
        #[sea_orm(
            belongs_to = "super::Entity",
            from = "Column::ActivityId",
            to = "super::Column::Id"
        )]
        Activity,
    }

    impl Related<super::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Activity.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}
