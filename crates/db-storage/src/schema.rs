// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

diesel::table! {
    events (id) {
        id -> Uuid,
        title -> Text,
        description -> Text,
        starts_at -> Timestamptz,
        ends_at -> Nullable<Timestamptz>,
        rsvp_deadline -> Nullable<Timestamptz>,
        reminder_schedule -> Nullable<Text>,
        max_guests_per_invitee -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    guests (id) {
        id -> Uuid,
        event_id -> Uuid,
        name -> Text,
        email -> Text,
        phone -> Nullable<Text>,
        status -> Text,
        notify_by_email -> Bool,
        notify_by_sms -> Bool,
        token -> Text,
        reminder_sent_at -> Nullable<Timestamptz>,
        sms_reminder_sent_at -> Nullable<Timestamptz>,
        max_guests -> Nullable<Int4>,
        dietary_notes -> Nullable<Text>,
        responded_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    additional_guests (id) {
        id -> Uuid,
        guest_id -> Uuid,
        name -> Text,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(additional_guests -> guests (guest_id));
diesel::joinable!(guests -> events (event_id));

diesel::allow_tables_to_appear_in_same_query!(additional_guests, events, guests,);
