use crate::config::Config;
use crate::error::Result;

pub async fn run(config: Config, json: bool) -> Result<()> {
    let pipeline = super::build_pipeline(&config)?;
    let snapshot = pipeline.initialize().await?;
    let stats = &snapshot.stats;

    if json {
        println!("{}", serde_json::to_string_pretty(stats)?);
    } else {
        println!("Source:      {}", config.corpus.source_url);
        println!("Documents:   {}", stats.documents);
        println!("Corpus hash: {}", stats.corpus_hash);
        println!("Chunks:      {}", stats.chunks);
        println!("Dimension:   {}", stats.dimension);
        println!("Model:       {}", stats.embedding_model);
        println!("Built:       {} ({} ms)", stats.built_at.to_rfc3339(), stats.build_ms);
    }
    Ok(())
}
