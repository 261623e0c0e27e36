// SPDX-FileCopyrightText: OpenTalk GmbH <mail@opentalk.eu>
//
// SPDX-License-Identifier: EUPL-1.2

use crate::migrations::type_polyfills::datetime;
use barrel::backend::Pg;
use barrel::{types, Migration};

pub fn migration() -> String {
    let mut migr = Migration::new();

    migr.inject_custom("CREATE EXTENSION IF NOT EXISTS pgcrypto");

    migr.create_table("events", |table| {
        table.add_column(
            "id",
            types::custom("UUID DEFAULT gen_random_uuid()").primary(true),
        );
        table.add_column("title", types::varchar(255).nullable(false));
        table.add_column("description", types::text().nullable(false));
        table.add_column("starts_at", datetime());
        table.add_column("ends_at", datetime().nullable(true));
        table.add_column("rsvp_deadline", datetime().nullable(true));
        table.add_column("reminder_schedule", types::text().nullable(true));
        table.add_column("max_guests_per_invitee", types::integer().nullable(true));
        table.add_column("created_at", types::custom("TIMESTAMPTZ DEFAULT NOW()"));
        table.add_column("updated_at", types::custom("TIMESTAMPTZ DEFAULT NOW()"));
        table.inject_custom("CHECK (rsvp_deadline IS NULL OR rsvp_deadline <= starts_at)");
        table.inject_custom(
            "CHECK (max_guests_per_invitee IS NULL OR max_guests_per_invitee >= 1)",
        );
    });

    migr.create_table("guests", |table| {
        table.add_column(
            "id",
            types::custom("UUID DEFAULT gen_random_uuid()").primary(true),
        );
        table.add_column(
            "event_id",
            types::custom("UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE"),
        );
        table.add_column("name", types::varchar(255).nullable(false));
        table.add_column("email", types::varchar(255).nullable(false));
        table.add_column("phone", types::varchar(64).nullable(true));
        table.add_column(
            "status",
            types::custom("TEXT NOT NULL DEFAULT 'PENDING'"),
        );
        table.add_column("notify_by_email", types::boolean().nullable(false));
        table.add_column("notify_by_sms", types::boolean().nullable(false));
        table.add_column("token", types::varchar(64).unique(true).nullable(false));
        table.add_column("reminder_sent_at", datetime().nullable(true));
        table.add_column("sms_reminder_sent_at", datetime().nullable(true));
        table.add_column("max_guests", types::integer().nullable(true));
        table.add_column("dietary_notes", types::text().nullable(true));
        table.add_column("responded_at", datetime().nullable(true));
        table.add_column("created_at", types::custom("TIMESTAMPTZ DEFAULT NOW()"));
        table.inject_custom(
            "CHECK (status IN ('PENDING', 'ATTENDING', 'NOT_ATTENDING', 'MAYBE'))",
        );
        table.inject_custom("CHECK (max_guests IS NULL OR max_guests >= 1)");
        table.inject_custom("CHECK (dietary_notes IS NULL OR char_length(dietary_notes) <= 1000)");
        table.inject_custom("UNIQUE (event_id, email)");
    });

    migr.create_table("additional_guests", |table| {
        table.add_column(
            "id",
            types::custom("UUID DEFAULT gen_random_uuid()").primary(true),
        );
        table.add_column(
            "guest_id",
            types::custom("UUID NOT NULL REFERENCES guests(id) ON DELETE CASCADE"),
        );
        table.add_column("name", types::varchar(255).nullable(false));
        table.add_column("created_at", types::custom("TIMESTAMPTZ DEFAULT NOW()"));
    });

    migr.inject_custom("CREATE INDEX events_starts_at_idx ON events(starts_at)");
    migr.inject_custom("CREATE INDEX guests_event_status_idx ON guests(event_id, status)");
    migr.inject_custom(
        "CREATE INDEX additional_guests_guest_id_idx ON additional_guests(guest_id)",
    );

    migr.make::<Pg>()
}
