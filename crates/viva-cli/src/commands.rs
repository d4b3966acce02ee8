use std::path::Path;

use serde::Serialize;
use serde_json::json;
use viva_core::models::{AnkiCard, Envelope, NewWordReview};
use viva_core::{ImageUpload, VivaContext};

use crate::cli::{Command, EssayAction, WordAction};
use crate::error::CliError;

pub fn run(ctx: &VivaContext, command: Command) -> Result<(), CliError> {
    let api = &ctx.api;
    match command {
        Command::Login { google_token } => {
            let payload = ctx.login_with_google(&google_token)?;
            print_json(&json!({ "message": payload.message, "user": payload.user }))
        }
        Command::Logout => {
            ctx.sign_out()?;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = ctx.session.session()?;
            let user_info = api.get_user_info()?.data;
            print_json(&json!({
                "isLoggedIn": session.is_logged_in,
                "user": session.user,
                "userInfo": user_info,
            }))
        }
        Command::Essays { action } => match action {
            EssayAction::List => print_json(&api.get_essays()?.data),
            EssayAction::Show { id } => print_json(&api.get_essay(id)?.data),
            EssayAction::Submit { content, image } => {
                let image = image.as_deref().map(read_image).transpose()?;
                print_json(&api.submit_essay(&content, image)?.data)
            }
            EssayAction::Sentences { id } => print_json(&api.get_essay_sentence_ids(id)?.data),
        },
        Command::Sentence { id } => print_json(&api.get_sentence_with_mappings(id)?.data),
        Command::Words { action } => match action {
            WordAction::Add(args) => {
                let word = NewWordReview {
                    word: args.word,
                    wrong_word: args.wrong_word,
                    translation: args.translation,
                    example_sentence: args.example,
                };
                print_json(&envelope_data(api.add_word_to_review(&word)?.data)?)
            }
            WordAction::Search { keyword } => {
                let keyword = keyword.unwrap_or_default();
                print_json(&envelope_data(api.search_words(&keyword)?.data)?)
            }
            WordAction::Count => print_json(&envelope_data(api.get_word_review_count()?.data)?),
            WordAction::Due => print_json(&envelope_data(api.get_word_review_list()?.data)?),
            WordAction::Show { id } => {
                print_json(&envelope_data(api.get_word_review_info(id)?.data)?)
            }
            WordAction::Review { id, quality } => {
                print_json(&envelope_data(api.put_word_review(id, quality)?.data)?)
            }
            WordAction::Known { id, unknown } => {
                print_json(&envelope_data(api.post_word_review_know(id, !unknown)?.data)?)
            }
            WordAction::Stat => print_json(&envelope_data(api.get_review_stat()?.data)?),
            WordAction::DayStat { start, end } => {
                print_json(&envelope_data(api.get_review_day_stat(start, end)?.data)?)
            }
            WordAction::Anki(args) => {
                let card = AnkiCard {
                    sentence: args.sentence,
                    mapping_chinese: args.chinese,
                    mapping_wrong_english: args.wrong_english,
                    mapping_correct_english: args.correct_english,
                };
                print_json(&api.add_word_to_anki(&card)?.data)
            }
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Unwrap a word-review envelope, turning a non-zero status into an error.
fn envelope_data<T>(envelope: Envelope<T>) -> Result<Option<T>, CliError> {
    if envelope.is_ok() {
        Ok(envelope.data)
    } else {
        Err(CliError::Backend(
            envelope
                .message
                .unwrap_or_else(|| format!("status {}", envelope.status)),
        ))
    }
}

fn read_image(path: &Path) -> Result<ImageUpload, CliError> {
    let data = std::fs::read(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    log::debug!("Attaching {} ({}, {} bytes)", filename, content_type, data.len());
    Ok(ImageUpload {
        filename,
        content_type,
        data,
    })
}
