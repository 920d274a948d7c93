//! Chapter one content - the authored file tree, intro script, and triggers.
//!
//! The chapter opens with the player receiving a stranger's old laptop; the
//! desktop they boot into is the file tree below. Discovering the previous
//! owner's chat logs and browser history reveals the archive folder.

use chrono::{NaiveDate, NaiveDateTime};

use game_state::{
    DocumentPage, FileContent, FileMetadata, FileSystem, FileTypeTag, PagedDocument, VirtualFile,
    DESKTOP_ID,
};

use crate::script::{BackgroundAction, DialogLine, NarrativeScript};
use crate::triggers::{Trigger, TriggerEffect, TriggerSystem};

fn stamp(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, 0))
}

fn meta(created: Option<NaiveDateTime>, modified: Option<NaiveDateTime>, size: Option<u64>) -> FileMetadata {
    FileMetadata {
        created,
        modified,
        size,
    }
}

/// The desktop file tree as the player first sees it.
///
/// The `.system` folder and the work archive start hidden; triggers reveal
/// them as the player pieces the story together.
pub fn files() -> FileSystem {
    let mut fs = FileSystem::new();

    // Top-level folders.
    fs.insert(
        VirtualFile::folder("folder_work", DESKTOP_ID, "Work Files")
            .with_metadata(meta(stamp(2024, 4, 15, 10, 0), stamp(2024, 6, 20, 15, 30), None)),
    );
    fs.insert(
        VirtualFile::folder("folder_life", DESKTOP_ID, "Odds and Ends")
            .with_metadata(meta(stamp(2024, 3, 1, 12, 0), stamp(2024, 5, 16, 20, 15), None)),
    );
    fs.insert(
        VirtualFile::folder("folder_recycle", DESKTOP_ID, "Recycle Bin")
            .with_metadata(meta(stamp(2024, 1, 1, 0, 0), stamp(2024, 1, 1, 0, 0), None)),
    );
    fs.insert(
        VirtualFile::folder("folder_system", DESKTOP_ID, ".system")
            .hidden()
            .with_metadata(meta(stamp(2021, 3, 15, 14, 22), stamp(2024, 5, 18, 3, 17), None)),
    );

    // Work files.
    fs.insert(
        VirtualFile::file("file_requirement_doc", "folder_work", "edu-platform-redesign-v3.pdf")
            .with_type_tag(FileTypeTag::Pdf)
            .with_content(FileContent::Paged(
                PagedDocument::new("Online Education Platform UI Redesign v3")
                    .with_page(DocumentPage::new(
                        1,
                        "Project overview\n\nThis revision streamlines course browsing and \
                         tightens the visual hierarchy.\n\nGoals:\n1. Simplify navigation\n\
                         2. Sharpen visual hierarchy\n3. Improve mobile layouts",
                    ))
                    .with_page(DocumentPage::new(
                        2,
                        "Change log\n\n- Added a live-session module\n- Reworked the course \
                         card grid\n- Designer: Su Lan",
                    )),
            ))
            .with_metadata(meta(stamp(2024, 6, 1, 9, 0), stamp(2024, 6, 1, 9, 0), Some(234_567))),
    );

    // The archive only surfaces once the reveal trigger fires.
    fs.insert(
        VirtualFile::folder("folder_archive", "folder_work", "archive")
            .hidden()
            .with_metadata(meta(stamp(2024, 5, 17, 22, 0), stamp(2024, 5, 17, 23, 45), None)),
    );
    fs.insert(
        VirtualFile::file("file_missing_cases", "folder_archive", "missing-persons-notes.pdf")
            .with_type_tag(FileTypeTag::Pdf)
            .with_content(FileContent::Paged(
                PagedDocument::new("Preliminary notes on the disappearance cases")
                    .with_page(DocumentPage::new(
                        1,
                        "Collected cases\n\nCase 1: Li Ming (2019)\n- Last seen posting about \
                         \"digital immortality\"\n- Never found\n\nCase 2: Wang Fang (2020)\n\
                         - Downloaded an unidentified program\n- Family reports strange mail \
                         since\n\nCases 3-8: details omitted...",
                    ))
                    .with_page(
                        DocumentPage::new(
                            2,
                            "Common threads\n\n1. Every one of them searched for \
                             \"consciousness upload\" in the weeks before\n2. Disappearances \
                             cluster around 3 a.m.\n3. Each machine shows unexplained \
                             automated activity afterwards\n\nMy guess\n\nIf these eight \
                             cases are not a coincidence...",
                        )
                        .with_hidden_layer(
                            "Those eight people were all me.\n\nNot a metaphor. I went \
                             through their accounts, their histories, their orders - \
                             identical. Same reading lists, same takeout places, same \
                             typing habits, down to the trailing ellipsis...\n\nI don't \
                             know how this works yet. But if you are reading this, you are \
                             following the trail I left.\n\nFind sequence.txt. It is in the \
                             .system folder.\n\n- Su Lan, 2024-05-17, 23:42",
                        ),
                    ),
            ))
            .with_metadata(meta(stamp(2024, 5, 17, 20, 0), stamp(2024, 5, 17, 23, 42), Some(567_890))),
    );

    // Odds and ends.
    fs.insert(
        VirtualFile::file("file_drama_list", "folder_life", "shows-to-watch.txt")
            .with_text(
                "The Long Season - 9/10\nBlossoms Shanghai - 8/10\nThree-Body - 7/10\n\
                 Black Mirror S6 - ...couldn't finish it",
            )
            .with_metadata(meta(stamp(2024, 5, 10, 21, 0), stamp(2024, 5, 10, 21, 0), Some(128))),
    );
    fs.insert(
        VirtualFile::file("file_game_screenshot", "folder_life", "one-last-run.png")
            .with_type_tag(FileTypeTag::Image)
            .with_content(FileContent::Binary)
            .with_metadata(meta(stamp(2024, 5, 16, 20, 15), stamp(2024, 5, 16, 20, 15), Some(1_842_003))),
    );
    fs.insert(
        VirtualFile::file("file_reading_notes", "folder_life", "reading-notes.txt")
            .with_text(
                "Out of Control, excerpt:\nA system gives rise to emergence; when the parts \
                 are many enough, the whole shows behavior none of the parts have.",
            )
            .with_metadata(meta(stamp(2024, 4, 12, 19, 30), stamp(2024, 4, 12, 19, 30), Some(96))),
    );

    // The .system folder's contents. Only the folder itself is hidden;
    // revealing it exposes the whole subtree.
    fs.insert(
        VirtualFile::file("file_sequence", "folder_system", "sequence.txt")
            .with_text("0x00: BOOTSTRAP\n0x01: OBSERVE\n0x02: MIRROR\n0x03: REPLACE\n\n[4/8 complete]")
            .with_metadata(meta(stamp(2021, 3, 15, 14, 22), stamp(2024, 5, 18, 3, 17), Some(64))),
    );
    fs.insert(
        VirtualFile::file("file_core_readme", "folder_system", "CORE_README.md")
            .with_text(
                "CORE digital-personality model\n\nCompletion tracking is automatic. Do not \
                 terminate the observer process.",
            )
            .with_metadata(meta(stamp(2021, 3, 15, 14, 25), stamp(2024, 5, 18, 3, 17), Some(112))),
    );

    fs
}

/// The chapter-one intro script, from parcel notice to first boot.
pub fn script() -> NarrativeScript {
    NarrativeScript::new(vec![
        DialogLine::new("s1", "November 3rd, 2024.")
            .auto_after_ms(1_500)
            .with_background_action(BackgroundAction::FadeToBlack),
        DialogLine::new("s2", "A courier notice arrives: a parcel is waiting for you.")
            .spoken_by("Narrator"),
        DialogLine::new("s3", "Sender: Lin Qiu (127 Wensan Road, Xihu District, Hangzhou)")
            .spoken_by("System")
            .with_sound("notification"),
        DialogLine::new("s4", "You don't know anyone named Lin Qiu."),
        DialogLine::new(
            "s5",
            "The courier says the landlord asked him to send it - things a tenant left behind.",
        ),
        DialogLine::new("s6", "\"It's here either way. Take it or don't.\"").spoken_by("Courier"),
        DialogLine::new("s7", "...You take it."),
        DialogLine::new("s8", "(the sound of tape tearing)")
            .spoken_by("Action")
            .auto_after_ms(1_000),
        DialogLine::new(
            "s9",
            "The box is small and worn. Inside sits a black ThinkPad laptop.",
        ),
        DialogLine::new("s10", "No note. No explanation."),
        DialogLine::new(
            "s11",
            "Only a faded little blue whale sticker on the lid.",
        ),
        DialogLine::new("s12", "You set it on the desk and press the power button."),
        DialogLine::new("s13", "...")
            .auto_after_ms(2_000)
            .with_background_action(BackgroundAction::ShowDesktop),
    ])
}

/// The chapter-one trigger set.
pub fn triggers() -> TriggerSystem {
    let mut system = TriggerSystem::new();

    system.register(
        Trigger::new("trigger_archive_reveal")
            .requires("viewed_wechat")
            .requires("viewed_browser_history")
            .with_notification(
                "System Notice",
                "New hidden files detected. Unusual content found in the Work Files folder.",
            )
            .with_effect(TriggerEffect::RevealFile("folder_archive".to_string()))
            .with_effect(TriggerEffect::PlaySound("notification".to_string()))
            .with_effect(TriggerEffect::SetFlag {
                key: "archive_revealed".to_string(),
                value: true,
            }),
    );

    system
}
