//! Behavioural tests for deriving summit image keys.

use std::cell::RefCell;
use std::collections::HashSet;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use thousands_core::{SummitImageKeys, summit_image_keys};

#[derive(Default)]
struct KeyWorld {
    comments: RefCell<Vec<Option<String>>>,
    keys: RefCell<Vec<SummitImageKeys>>,
}

#[fixture]
fn world() -> KeyWorld {
    KeyWorld::default()
}

fn first_keys(world: &KeyWorld) -> SummitImageKeys {
    world
        .keys
        .borrow()
        .first()
        .cloned()
        .expect("keys derived for the first image")
}

#[given("summit s1 with an image commented Вид")]
fn given_single_comment(world: &KeyWorld) {
    world.comments.replace(vec![Some("Вид".to_owned())]);
}

#[given("summit s1 with two images commented Вид")]
fn given_duplicate_comments(world: &KeyWorld) {
    world
        .comments
        .replace(vec![Some("Вид".to_owned()), Some("Вид".to_owned())]);
}

#[given("summit s1 with an uncommented image")]
fn given_no_comment(world: &KeyWorld) {
    world.comments.replace(vec![None]);
}

#[when("I derive the keys for the first image")]
fn when_derive_first(world: &KeyWorld) {
    let comments = world.comments.borrow();
    let comment = comments.first().expect("an image was given").as_deref();
    world.keys.replace(vec![summit_image_keys("s1", comment, 0)]);
}

#[when("I derive the keys for every image")]
fn when_derive_all(world: &KeyWorld) {
    let keys = world
        .comments
        .borrow()
        .iter()
        .enumerate()
        .map(|(index, comment)| summit_image_keys("s1", comment.as_deref(), index))
        .collect();
    world.keys.replace(keys);
}

#[then("the image key is summits/s1_vid_0.jpg")]
fn then_commented_image_key(world: &KeyWorld) {
    assert_eq!(first_keys(world).url, "summits/s1_vid_0.jpg");
}

#[then("the preview key is summits/s1_vid_0_preview.jpg")]
fn then_commented_preview_key(world: &KeyWorld) {
    assert_eq!(first_keys(world).preview_url, "summits/s1_vid_0_preview.jpg");
}

#[then("the image key is summits/s1_0.jpg")]
fn then_bare_image_key(world: &KeyWorld) {
    assert_eq!(first_keys(world).url, "summits/s1_0.jpg");
}

#[then("the preview key is summits/s1_0_preview.jpg")]
fn then_bare_preview_key(world: &KeyWorld) {
    assert_eq!(first_keys(world).preview_url, "summits/s1_0_preview.jpg");
}

#[then("every derived key is distinct")]
fn then_keys_distinct(world: &KeyWorld) {
    let keys = world.keys.borrow();
    let all: Vec<&str> = keys
        .iter()
        .flat_map(|pair| [pair.url.as_str(), pair.preview_url.as_str()])
        .collect();
    let unique: HashSet<&str> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len(), "duplicate keys in {all:?}");
}

#[scenario(path = "tests/features/asset_keys.feature", index = 0)]
fn russian_comment(world: KeyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/asset_keys.feature", index = 1)]
fn shared_comment(world: KeyWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/asset_keys.feature", index = 2)]
fn missing_comment(world: KeyWorld) {
    let _ = world;
}
