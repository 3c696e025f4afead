table! {
    bible_versions (id) {
        id -> Text,
        name -> Text,
        abbreviation -> Text,
        language -> Text,
        description -> Nullable<Text>,
    }
}

table! {
    bookmarks (id) {
        id -> Text,
        user_id -> Text,
        verse_id -> Integer,
        color -> Text,
        note -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    books (id) {
        id -> Text,
        name -> Text,
        testament -> Text,
        chapters -> Integer,
        canonical_order -> Integer,
    }
}

table! {
    chapters (id) {
        id -> Integer,
        book_id -> Text,
        number -> Integer,
    }
}

table! {
    outlines (id) {
        id -> Text,
        user_id -> Text,
        title -> Text,
        content -> Text,
        verses -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

table! {
    user_settings (user_id) {
        user_id -> Text,
        bible_version_id -> Text,
        font_size -> Integer,
        dark_mode -> Bool,
    }
}

table! {
    users (id) {
        id -> Text,
        email -> Text,
        name -> Nullable<Text>,
    }
}

table! {
    verses (id) {
        id -> Integer,
        chapter_id -> Integer,
        number -> Integer,
        text -> Text,
        bible_version_id -> Text,
    }
}

joinable!(bookmarks -> users (user_id));
joinable!(bookmarks -> verses (verse_id));
joinable!(chapters -> books (book_id));
joinable!(outlines -> users (user_id));
joinable!(user_settings -> users (user_id));
joinable!(verses -> bible_versions (bible_version_id));
joinable!(verses -> chapters (chapter_id));

allow_tables_to_appear_in_same_query!(
    bible_versions,
    bookmarks,
    books,
    chapters,
    outlines,
    user_settings,
    users,
    verses,
);
