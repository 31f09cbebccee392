mod common;

use chrono::NaiveTime;
use common::{dispatcher, RecordingDevices, RecordingLauncher};
use herald::config::PhraseEntry;
use herald::intent::{DeviceAction, Intent, IntentRecord};
use herald::kernel::actions::format_time;
use herald::kernel::dispatcher::{FAREWELL, GENERIC_ACK, NOT_UNDERSTOOD};
use herald::kernel::{Control, Tier};
use herald::services::PhraseTable;

fn phrases() -> PhraseTable {
    PhraseTable::new(&[
        PhraseEntry { phrase: "Thank you".into(), response: "You're welcome!".into() },
        PhraseEntry { phrase: "light".into(), response: "Lights are nice.".into() },
        PhraseEntry { phrase: "bye".into(), response: "See you.".into() },
    ])
}

#[tokio::test]
async fn test_turn_on_the_light() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, phrases());

    let record = IntentRecord::new(Intent::ControlIot)
        .with_device("light")
        .with_action(DeviceAction::On);
    let dispatch = dispatcher.dispatch(&record, "Turn on the light").await;

    assert_eq!(dispatch.tier, Tier::Device, "phrase table must not shadow device control");
    assert!(dispatch.reply.contains("light") && dispatch.reply.contains("on"), "got {:?}", dispatch.reply);
    assert_eq!(devices.calls(), vec![("light".to_string(), DeviceAction::On)]);
}

#[tokio::test]
async fn test_device_defaults() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, PhraseTable::default());

    let dispatch = dispatcher.dispatch(&IntentRecord::new(Intent::ControlIot), "do the thing").await;
    assert_eq!(dispatch.tier, Tier::Device);
    assert_eq!(devices.calls(), vec![("unknown device".to_string(), DeviceAction::Off)]);
}

#[tokio::test]
async fn test_open_google_with_query_behaves_like_search() {
    let launcher_a = RecordingLauncher::default();
    let launcher_b = RecordingLauncher::default();
    let devices = RecordingDevices::default();

    let google = IntentRecord::new(Intent::OpenGoogle).with_query("weather in London");
    let search = IntentRecord::new(Intent::PerformSearch).with_query("weather in London");

    let a = dispatcher(&launcher_a, &devices, PhraseTable::default())
        .dispatch(&google, "Search for weather in London")
        .await;
    let b = dispatcher(&launcher_b, &devices, PhraseTable::default())
        .dispatch(&search, "Search for weather in London")
        .await;

    assert_eq!(a, b);
    assert_eq!(a.tier, Tier::Builtin);
    assert_ne!(a.reply, NOT_UNDERSTOOD);
    assert_eq!(launcher_a.opened(), launcher_b.opened());
    assert_eq!(launcher_a.opened(), vec!["https://www.google.com/search?q=weather%20in%20London".to_string()]);
}

#[tokio::test]
async fn test_builtin_tier_wins() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, PhraseTable::default());

    let cases = [
        (IntentRecord::new(Intent::OpenGoogle), "Opening Google."),
        (IntentRecord::new(Intent::OpenYoutube), "Opening YouTube."),
        (IntentRecord::new(Intent::PlayMusic).with_query("lofi beats"), "Playing lofi beats on YouTube."),
        (IntentRecord::new(Intent::PlayMusic), "Playing music on YouTube."),
    ];
    for (record, expected) in cases {
        let dispatch = dispatcher.dispatch(&record, "whatever").await;
        assert_eq!(dispatch.tier, Tier::Builtin);
        assert_eq!(dispatch.reply, expected);
        assert_eq!(dispatch.control, Control::Continue);
    }
    assert_eq!(launcher.opened().len(), 4);
    assert!(devices.calls().is_empty());
}

#[tokio::test]
async fn test_get_time() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatch = dispatcher(&launcher, &devices, PhraseTable::default())
        .dispatch(&IntentRecord::new(Intent::GetTime), "What time is it?")
        .await;

    assert_eq!(dispatch.tier, Tier::Builtin);
    assert!(dispatch.reply.starts_with("The time is "));
    assert!(launcher.opened().is_empty());

    let afternoon = NaiveTime::from_hms_opt(15, 5, 0).unwrap();
    assert_eq!(format_time(afternoon), "The time is 3:05 PM.");
}

#[tokio::test]
async fn test_search_without_query_falls_through() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatch = dispatcher(&launcher, &devices, PhraseTable::default())
        .dispatch(&IntentRecord::new(Intent::PerformSearch), "search")
        .await;

    assert_eq!(dispatch.tier, Tier::Fallback);
    assert_eq!(dispatch.reply, NOT_UNDERSTOOD);
    assert!(launcher.opened().is_empty());
}

#[tokio::test]
async fn test_phrase_table_answers_inside_builtin_tier() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, phrases());

    // Matches case-insensitively and takes priority over the general-question tier.
    let record = IntentRecord::new(Intent::GeneralQuestion).with_reply("No problem at all.");
    let dispatch = dispatcher.dispatch(&record, "thank YOU so much").await;
    assert_eq!(dispatch.tier, Tier::Builtin);
    assert_eq!(dispatch.reply, "You're welcome!");

    // Never consulted for exit.
    let dispatch = dispatcher.dispatch(&IntentRecord::new(Intent::Exit), "ok bye").await;
    assert_eq!(dispatch.tier, Tier::Exit);
}

#[tokio::test]
async fn test_exit_signals_termination() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatch = dispatcher(&launcher, &devices, PhraseTable::default())
        .dispatch(&IntentRecord::new(Intent::Exit), "Goodbye")
        .await;

    assert_eq!(dispatch.tier, Tier::Exit);
    assert_eq!(dispatch.reply, FAREWELL);
    assert_eq!(dispatch.control, Control::Exit);
}

#[tokio::test]
async fn test_general_question() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, PhraseTable::default());

    let with_reply = IntentRecord::new(Intent::GeneralQuestion).with_reply("Paris.");
    let dispatch = dispatcher.dispatch(&with_reply, "Capital of France?").await;
    assert_eq!((dispatch.tier, dispatch.reply.as_str()), (Tier::GeneralQuestion, "Paris."));

    let dispatch = dispatcher.dispatch(&IntentRecord::new(Intent::GeneralQuestion), "Hmm?").await;
    assert_eq!(dispatch.reply, GENERIC_ACK);
}

#[tokio::test]
async fn test_exactly_one_tier_per_intent() {
    let (launcher, devices) = (RecordingLauncher::default(), RecordingDevices::default());
    let dispatcher = dispatcher(&launcher, &devices, PhraseTable::default());

    for intent in Intent::ALL {
        let record = IntentRecord::new(intent).with_query("cats");
        let dispatch = dispatcher.dispatch(&record, "cats").await;
        let expected = match intent {
            Intent::PerformSearch | Intent::OpenGoogle | Intent::OpenYoutube | Intent::PlayMusic | Intent::GetTime => {
                Tier::Builtin
            }
            Intent::ControlIot => Tier::Device,
            Intent::Exit => Tier::Exit,
            Intent::GeneralQuestion => Tier::GeneralQuestion,
            Intent::Unknown => Tier::Fallback,
        };
        assert_eq!(dispatch.tier, expected, "intent {intent}");
        assert!(!dispatch.reply.is_empty());
    }
    // Only the control_iot record reached the device tier.
    assert_eq!(devices.calls().len(), 1);
}

#[tokio::test]
async fn test_simulated_devices_track_state() {
    use herald::services::{DeviceController, SimulatedDevices};

    let devices = SimulatedDevices::new();
    assert_eq!(devices.state("heater"), None);

    let reply = devices.control_device("Heater", DeviceAction::On).await.unwrap();
    assert_eq!(reply, "Turning on the Heater.");
    assert_eq!(devices.state("heater"), Some(DeviceAction::On));

    devices.control_device("heater", DeviceAction::Off).await.unwrap();
    assert_eq!(devices.state("HEATER"), Some(DeviceAction::Off));
}
