//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. When a
//! migration changes the schema, regenerate with `diesel print-schema` or
//! update by hand.

diesel::table! {
    /// Staff profiles mirrored from the identity provider.
    profiles (user_id) {
        user_id -> Uuid,
        display_name -> Varchar,
        email -> Text,
        active -> Bool,
        approved -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Exactly one role per profile.
    user_roles (user_id) {
        user_id -> Uuid,
        role -> Text,
    }
}

diesel::table! {
    user_permissions (user_id, permission) {
        user_id -> Uuid,
        permission -> Text,
    }
}

diesel::table! {
    /// SHA-256 digests of bearer tokens.
    access_tokens (token_digest) {
        token_digest -> Text,
        user_id -> Uuid,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    admin_settings (key) {
        key -> Text,
        value -> Text,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Fixed-window attempt counters keyed by `<purpose>:<userId>`.
    rate_limit_attempts (key) {
        key -> Text,
        attempts -> Int4,
        window_start -> Timestamptz,
    }
}

diesel::table! {
    admin_audit_log (id) {
        id -> Int8,
        actor_id -> Uuid,
        target_id -> Uuid,
        purpose -> Text,
        outcome -> Text,
        ip_address -> Nullable<Text>,
        user_agent -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    repair_types (id) {
        id -> Uuid,
        name -> Varchar,
        price_cents -> Int4,
        points -> Int4,
        applicable_models -> Array<Text>,
        active -> Bool,
    }
}

diesel::table! {
    /// Bikes in the workshop; `table_number` is unique among open bikes.
    bikes (id) {
        id -> Uuid,
        frame_number -> Varchar,
        model -> Text,
        workflow_status -> Text,
        table_number -> Nullable<Text>,
        current_mechanic_id -> Nullable<Uuid>,
        diagnosed_by_id -> Nullable<Uuid>,
        customer_note -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    work_registrations (id) {
        id -> Uuid,
        bike_id -> Uuid,
        repair_type_id -> Uuid,
        approval -> Text,
        completed -> Bool,
        proposed_by -> Uuid,
        completed_by -> Nullable<Uuid>,
        completed_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    availability (id) {
        id -> Uuid,
        user_id -> Uuid,
        date -> Date,
        start_time -> Time,
        end_time -> Time,
        notes -> Nullable<Text>,
        status -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    tv_announcements (id) {
        id -> Uuid,
        message -> Text,
        background_color -> Text,
        text_color -> Text,
        icon -> Nullable<Text>,
        fullscreen -> Bool,
        active -> Bool,
        expires_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(user_roles -> profiles (user_id));
diesel::joinable!(user_permissions -> profiles (user_id));
diesel::joinable!(work_registrations -> bikes (bike_id));
diesel::joinable!(work_registrations -> repair_types (repair_type_id));
diesel::joinable!(availability -> profiles (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    profiles,
    user_roles,
    user_permissions,
    access_tokens,
    admin_settings,
    rate_limit_attempts,
    admin_audit_log,
    repair_types,
    bikes,
    work_registrations,
    availability,
    tv_announcements,
);
