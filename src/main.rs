use anyhow::Result;
use lovebook::config::Config;
use lovebook::genai;
use lovebook::pipeline::StoryPipeline;
use lovebook::store::StoryStore;
use lovebook::tools;
use lovebook::ui;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // 1. Load config
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            eprintln!("Please ensure 'config.yml' exists with valid generation settings.");
            return Err(e);
        }
    };

    config.ensure_directories()?;

    // 2. Generation client; credential problems surface here, before any
    // form is filled in.
    let client = genai::create_client(&config)?;

    // 3. Story store
    let store = StoryStore::new(&config.data_file);

    // 4. Menu loop
    loop {
        println!();
        match ui::main_menu()? {
            ui::MENU_LOVE_LETTER => {
                let request = ui::letter_form()?;
                let letter = tools::write_love_letter(client.as_ref(), &request).await;
                println!("\n{}\n", letter);
            }
            ui::MENU_FLIRTY_TEXTS => {
                let request = ui::flirty_form()?;
                let texts = tools::write_flirty_texts(client.as_ref(), &request).await;
                println!("\n{}\n", texts);
            }
            ui::MENU_FUTURE_US => {
                let request = ui::future_form()?;
                let scenario = tools::write_future_us(client.as_ref(), &request).await;
                println!("\n{}\n", scenario);
            }
            ui::MENU_STORYBOOK => {
                let request = ui::story_form()?;
                let comic_mode = ui::storybook_mode()?;
                let pipeline = StoryPipeline::new(client.as_ref(), &store);

                let outcome = if comic_mode {
                    let photos = ui::story_photos()?;
                    pipeline.create_comic_story(&request, &photos).await
                } else {
                    pipeline.create_text_story(&request).await
                };

                match outcome {
                    Ok(outcome) => ui::show_outcome(&outcome),
                    Err(e) => {
                        log::error!("Story generation failed: {:#}", e);
                        println!("Something went wrong. Please try again.");
                    }
                }
            }
            ui::MENU_READ_STORY => ui::read_story_flow(&store)?,
            _ => break,
        }
    }

    Ok(())
}
