use anyhow::Context;
use rotapost_core::{io, paths};
use std::path::Path;

const SETTINGS_YAML: &str = r#"posting:
  max_posts_per_day: 6
  min_posts_per_day: 4
  min_delay_minutes: 20
  max_delay_minutes: 45
photos:
  base_path: photos
safety:
  dry_run: false
  max_failures: 3
  pause_file: paused.lock
selection:
  # retry: failed posts are logged but the content stays eligible
  # consume: any attempt uses the content up for that destination
  failure_policy: retry
  promo_categories: [promo, repairs, smart_home, data_recovery, network]
  photo_adjacency:
    tips: []
    security: []
    promo: [brand]
    smart_home: [network]
    data_recovery: [repairs]
  follow_up_comments:
    - "Questions? Send us a message."
    - "Happy to help if anything here is unclear."
"#;

const DESTINATIONS_YAML: &str = r#"- id: local-tips
  name: Local Tech Tips
  url: https://example.com/groups/local-tips
  tier: 1
  audience_segment: community
  content_tags: [tips, security]
  posting_rules:
    promo_days: [monday, wednesday, friday]
    max_frequency: 1 per week
    promo_allowed: false
  active: true
- id: neighbours
  name: Neighbourhood Board
  url: https://example.com/groups/neighbours
  tier: 2
  audience_segment: seniors
  content_tags: [tips, repairs, smart_home, network]
  posting_rules:
    max_frequency: 1 per week
  active: true
- id: shop-page
  name: Shop Page
  url: https://example.com/shop
  type: page
  active: true
"#;

const CONTENT_YAML: &str = r#"- id: security-passwords
  category: security
  day: 1
  suggested_photos: [lock.jpg]
  variations:
    community: Use a password manager and turn on two-step login for email.
    seniors: A password manager remembers your passwords so you do not have to.
- id: network-wifi
  category: network
  day: 2
  variations:
    community: Restarting your router once a month clears up many slow Wi-Fi problems.
- id: tips-updates
  category: tips
  day: 3
  variations:
    community: Install system updates when prompted; most fix security holes.
    seniors: Updates keep your computer safe. Say yes when it asks.
- id: repairs-screens
  category: repairs
  day: 4
  variations:
    community: A cracked screen can often be replaced the same day.
- id: page-monday
  category: repairs
  content_type: page
  schedule_day: monday
  variations:
    page: New week, same friendly repairs. Drop in any time.
- id: page-wednesday
  category: tips
  content_type: page
  schedule_day: wednesday
  variations:
    page: Midweek tip. Back up your photos before they are gone.
- id: page-friday
  category: smart_home
  content_type: page
  schedule_day: friday
  variations:
    page: Setting up a smart speaker this weekend? We can help.
"#;

const PHOTOS_YAML: &str = r#"- filename: lock.jpg
  category: security
  description: Padlock resting on a keyboard
- filename: router.jpg
  category: network
- filename: workbench.jpg
  category: repairs
"#;

const SCHEDULE_YAML: &str = r#"week_a:
  monday: [local-tips]
  tuesday: [neighbours]
week_b:
  wednesday: [local-tips]
  thursday: [neighbours]
"#;

const RULES_YAML: &str = r#"local-tips:
  rules_captured: false
"#;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing rotapost in: {}", root.display());

    let data = paths::data_dir(root);
    std::fs::create_dir_all(&data).with_context(|| format!("failed to create {}", data.display()))?;
    let photos = root.join("photos");
    std::fs::create_dir_all(&photos)
        .with_context(|| format!("failed to create {}", photos.display()))?;

    let files = [
        (paths::SETTINGS_FILE, SETTINGS_YAML),
        (paths::DESTINATIONS_FILE, DESTINATIONS_YAML),
        (paths::CONTENT_FILE, CONTENT_YAML),
        (paths::PHOTOS_FILE, PHOTOS_YAML),
        (paths::SCHEDULE_FILE, SCHEDULE_YAML),
        (paths::RULES_FILE, RULES_YAML),
    ];
    for (rel, body) in files {
        let created = io::write_if_missing(&root.join(rel), body.as_bytes())
            .with_context(|| format!("failed to write {rel}"))?;
        if created {
            println!("  created: {rel}");
        } else {
            println!("  exists:  {rel}");
        }
    }

    println!("\nNext: edit the files above, then `rotapost config validate`.");
    Ok(())
}
