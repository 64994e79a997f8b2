pub mod verse_record;
