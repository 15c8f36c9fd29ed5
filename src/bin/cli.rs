use clap::Parser;
use std::path::PathBuf;
use terragen::{World, WorldGenerationParams};

/// Генератор мира для Terra Incognita
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Каталог для превью и сводки (по умолчанию: текущий)
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let params = WorldGenerationParams::from_toml_file(cli.config.to_str().unwrap())?;

    println!(
        "Генерация мира (размер: {}×{}, сид: {})...",
        params.width, params.height, params.seed
    );
    let world = World::generate(&params);

    let land_regions = world.regions.infos.iter().filter(|i| i.has_land()).count();
    let water_regions = world.regions.infos.len() - land_regions;
    println!(
        "🗺 Регионов: {} суши, {} воды; море вдоль края {:?}",
        land_regions, water_regions, world.coast_edge
    );

    let biome_path = cli.out_dir.join("biomes.png");
    world.biome.save_as_png(biome_path.to_str().unwrap())?;
    println!("Сохранено {:?}", biome_path);

    let regions_path = cli.out_dir.join("regions.png");
    terragen::region::png::save_as_png(&world.regions, regions_path.to_str().unwrap())?;
    println!("Сохранено {:?}", regions_path);

    let summary_path = cli.out_dir.join("regions.json");
    std::fs::write(
        &summary_path,
        serde_json::to_string_pretty(&world.regions.infos)?,
    )?;
    println!("Сохранено {:?}", summary_path);

    println!("\nГотово! Мир сгенерирован.");
    Ok(())
}
