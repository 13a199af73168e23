//! Ideamark CLI: the `imark` command.
//!
//! Checks drafts for originality, issues and verifies proofs of
//! submission, manages disputes, and ranks feeds from JSON snapshots of
//! the content store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;

use ideamark::{
    ContentDraft, ContentItem, CoreConfig, DisputeEvidence, DisputeId, DisputeOutcome,
    DisputeStatus, DisputeType, InteractionEvent, KeywordPriorArtProvider, OriginalityProof,
    ProofOptions, RecommendationScore, ScoringCore, SubjectId, UserId,
};

// ── Directory helpers ─────────────────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ideamark")
}

// ── Input helpers ─────────────────────────────────────────────────────────────

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid {what} file", path.display()))
}

fn read_corpus(path: Option<&Path>) -> Result<Vec<ContentItem>> {
    match path {
        Some(path) => read_json(path, "corpus"),
        None => Ok(Vec::new()),
    }
}

fn read_history(path: Option<&Path>) -> Result<Vec<InteractionEvent>> {
    match path {
        Some(path) => read_json(path, "history"),
        None => Ok(Vec::new()),
    }
}

fn split_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn micros_to_datetime(micros: u64) -> String {
    ideamark::time::micros_to_rfc3339(micros)
}

// ── CLI structure ─────────────────────────────────────────────────────────────

/// Ideamark CLI: check originality, issue and verify proofs of submission,
/// and rank personalized feeds.
#[derive(Parser, Debug)]
#[command(
    name = "imark",
    about = "Ideamark CLI",
    version,
    long_about = "imark: Ideamark CLI\n\nCheck drafts for originality, issue and verify proofs of submission,\nmanage disputes, and rank personalized feeds."
)]
struct Cli {
    /// Data directory for proofs, disputes and the service key (default: ~/.ideamark)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a draft for originality against a corpus
    Check {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// JSON array of content items to compare against
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Also consult the built-in keyword prior-art table
        #[arg(long)]
        prior_art: bool,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Issue and inspect proofs of submission
    Proof {
        #[command(subcommand)]
        subcommand: ProofCommands,
    },

    /// File and resolve originality disputes
    Dispute {
        #[command(subcommand)]
        subcommand: DisputeCommands,
    },

    /// Rank the four feed facets for a user
    Recommend {
        #[arg(long)]
        user: String,

        /// JSON array of content items
        #[arg(long)]
        corpus: PathBuf,

        /// JSON array of interaction events
        #[arg(long)]
        history: Option<PathBuf>,

        /// Evaluation time in microseconds (default: now)
        #[arg(long)]
        now: Option<u64>,

        /// Print the facets as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank trending items
    Trending {
        #[arg(long)]
        user: String,

        /// JSON array of content items
        #[arg(long)]
        corpus: PathBuf,

        /// JSON array of interaction events
        #[arg(long)]
        history: Option<PathBuf>,

        /// Evaluation time in microseconds (default: now)
        #[arg(long)]
        now: Option<u64>,

        /// Print the ranking as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ProofCommands {
    /// Hash, witness and certify a submission
    Generate {
        /// Subject (content item) identifier
        #[arg(long)]
        subject: String,

        #[arg(long)]
        author: String,

        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Additional witnesses beyond the system witness
        #[arg(long, default_value_t = 0)]
        extra_witnesses: usize,

        /// Certificate validity in days
        #[arg(long)]
        expires_in_days: Option<u64>,
    },

    /// Re-check a stored proof
    Verify {
        #[arg(long)]
        subject: String,

        /// Print the verification as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display a stored proof
    Show {
        #[arg(long)]
        subject: String,

        /// Print the full proof as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a pending proof as verified
    MarkVerified {
        #[arg(long)]
        subject: String,

        #[arg(long, default_value = "operator")]
        actor: String,
    },

    /// List subjects with a stored proof
    List,
}

#[derive(Subcommand, Debug)]
enum DisputeCommands {
    /// Open a dispute against a proof
    Submit {
        /// Subject whose proof is disputed
        #[arg(long)]
        original: String,

        /// Subject the dispute is raised on behalf of
        #[arg(long)]
        disputing: String,

        /// plagiarism, prior_art, simultaneous_invention or attribution
        #[arg(long)]
        r#type: String,

        /// Evidence description (repeatable)
        #[arg(long, required = true)]
        evidence: Vec<String>,

        /// Reference (URL, patent number) attached to the first evidence item
        #[arg(long)]
        reference: Option<String>,

        #[arg(long)]
        by: String,
    },

    /// Close a dispute with an outcome
    Resolve {
        #[arg(long)]
        dispute: String,

        /// original_upheld, dispute_upheld, both_original or insufficient_evidence
        #[arg(long)]
        outcome: String,

        #[arg(long)]
        resolver: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List disputes against a subject
    List {
        #[arg(long)]
        subject: String,
    },
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let verbose = cli.verbose;

    let result = run(cli, verbose);

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, verbose: bool) -> Result<()> {
    let config = match cli.config.as_deref() {
        Some(path) => CoreConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CoreConfig::default(),
    };
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    log::debug!("data directory: {}", data_dir.display());

    match cli.command {
        Commands::Check {
            title,
            description,
            tags,
            corpus,
            prior_art,
            json,
        } => {
            let draft = ContentDraft {
                id: None,
                title,
                description,
                tags: split_tags(tags.as_deref()),
            };
            cmd_check(config, &draft, corpus.as_deref(), prior_art, json, verbose)
        }
        Commands::Proof { subcommand } => {
            let core = open_core(&data_dir, config)?;
            match subcommand {
                ProofCommands::Generate {
                    subject,
                    author,
                    title,
                    description,
                    tags,
                    extra_witnesses,
                    expires_in_days,
                } => {
                    let draft = ContentDraft {
                        id: None,
                        title,
                        description,
                        tags: split_tags(tags.as_deref()),
                    };
                    let options = ProofOptions {
                        extra_witnesses,
                        expires_in_days,
                    };
                    cmd_proof_generate(&core, &subject, &author, &draft, &options, verbose)
                }
                ProofCommands::Verify { subject, json } => {
                    cmd_proof_verify(&core, &subject, json, verbose)
                }
                ProofCommands::Show { subject, json } => cmd_proof_show(&core, &subject, json),
                ProofCommands::MarkVerified { subject, actor } => {
                    cmd_proof_mark_verified(&core, &subject, &actor)
                }
                ProofCommands::List => cmd_proof_list(&core),
            }
        }
        Commands::Dispute { subcommand } => {
            let core = open_core(&data_dir, config)?;
            match subcommand {
                DisputeCommands::Submit {
                    original,
                    disputing,
                    r#type,
                    evidence,
                    reference,
                    by,
                } => cmd_dispute_submit(
                    &core,
                    &original,
                    &disputing,
                    &r#type,
                    evidence,
                    reference,
                    &by,
                ),
                DisputeCommands::Resolve {
                    dispute,
                    outcome,
                    resolver,
                    notes,
                } => cmd_dispute_resolve(&core, &dispute, &outcome, &resolver, &notes),
                DisputeCommands::List { subject } => cmd_dispute_list(&core, &subject),
            }
        }
        Commands::Recommend {
            user,
            corpus,
            history,
            now,
            json,
        } => {
            let core = ScoringCore::in_memory(config).context("failed to initialise scoring core")?;
            cmd_recommend(&core, &user, &corpus, history.as_deref(), now, json, verbose)
        }
        Commands::Trending {
            user,
            corpus,
            history,
            now,
            json,
        } => {
            let core = ScoringCore::in_memory(config).context("failed to initialise scoring core")?;
            cmd_trending(&core, &user, &corpus, history.as_deref(), now, json)
        }
    }
}

fn open_core(data_dir: &Path, config: CoreConfig) -> Result<ScoringCore> {
    ScoringCore::open(data_dir, config)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))
}

// ── Originality ───────────────────────────────────────────────────────────────

fn cmd_check(
    config: CoreConfig,
    draft: &ContentDraft,
    corpus_path: Option<&Path>,
    prior_art: bool,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let corpus = read_corpus(corpus_path)?;

    let mut core = ScoringCore::in_memory(config).context("failed to initialise scoring core")?;
    if prior_art {
        core = core.with_prior_art(Arc::new(KeywordPriorArtProvider::default()));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let verdict = runtime
        .block_on(core.check_originality(draft, &corpus))
        .context("originality check failed")?;

    if json {
        return print_json(&verdict);
    }

    let label = if verdict.is_original() {
        "original"
    } else {
        "duplicate"
    };
    println!("Originality: {label}");
    println!("  Similarity: {:.1}", verdict.similarity_score);
    println!("  Compared:   {} item(s)", corpus.len());

    if !verdict.similar_ideas.is_empty() {
        println!("  Similar ideas:");
        for result in &verdict.similar_ideas {
            println!("    {} ({:.1})", result.item_b, result.similarity);
            if verbose && !result.matching_elements.is_empty() {
                println!("      matching: {}", result.matching_elements.join(", "));
            }
        }
    }

    if !verdict.prior_art.is_empty() {
        println!("  Prior art:");
        for reference in &verdict.prior_art {
            println!(
                "    {} [{}] ({:?}, {:.0})",
                reference.title, reference.reference, reference.source, reference.relevance
            );
        }
    }
    if verdict.is_partial() {
        println!("  Prior art:  unavailable (corpus-only verdict)");
    }

    println!("  Recommended actions:");
    for action in &verdict.recommended_actions {
        println!("    - {action}");
    }

    Ok(())
}

// ── Proofs ────────────────────────────────────────────────────────────────────

fn cmd_proof_generate(
    core: &ScoringCore,
    subject: &str,
    author: &str,
    draft: &ContentDraft,
    options: &ProofOptions,
    verbose: bool,
) -> Result<()> {
    let proof = core
        .generate_proof(&SubjectId::new(subject), draft, &UserId::new(author), options)
        .context("failed to generate proof")?;

    println!("Proof created");
    print_proof_summary(&proof, verbose);
    Ok(())
}

fn print_proof_summary(proof: &OriginalityProof, verbose: bool) {
    println!("  ID:          {}", proof.id);
    println!("  Subject:     {}", proof.subject_id);
    println!("  Author:      {}", proof.author_id);
    println!("  Hash:        {}", proof.content_hash);
    println!("  Submitted:   {}", micros_to_datetime(proof.submission_timestamp));
    println!("  Status:      {}", proof.verification_status);
    println!("  Witnesses:   {}", proof.witness_signatures.len());
    println!("  Certificate: {}", proof.certificate.id);
    match proof.certificate.expires_at {
        Some(at) => println!("  Expires:     {}", micros_to_datetime(at)),
        None => println!("  Expires:     never"),
    }

    if verbose {
        println!("  Issuer:      {} ({})", proof.certificate.issuer, proof.certificate.issuer_key);
        for witness in &proof.witness_signatures {
            println!("    witness {} at {}", witness.witness, micros_to_datetime(witness.witnessed_at));
        }
    }
}

fn cmd_proof_verify(core: &ScoringCore, subject: &str, json: bool, verbose: bool) -> Result<()> {
    let verification = core
        .verify_proof(&SubjectId::new(subject))
        .context("failed to verify proof")?;

    if json {
        return print_json(&verification);
    }

    if verification.is_valid {
        println!("Proof VALID");
    } else {
        println!("Proof INVALID");
    }
    println!("  Subject:    {}", verification.subject_id);
    println!("  Confidence: {}", verification.confidence);

    if verbose {
        println!("  Checked:    {}", micros_to_datetime(verification.verified_at));
    }

    for issue in &verification.issues {
        println!("  - {:?}: {}", issue.kind, issue.message);
    }

    Ok(())
}

fn cmd_proof_show(core: &ScoringCore, subject: &str, json: bool) -> Result<()> {
    let proof = core
        .load_proof(&SubjectId::new(subject))
        .context("failed to load proof")?;

    if json {
        return print_json(&proof);
    }

    println!("Proof: {}", proof.subject_id);
    print_proof_summary(&proof, true);
    println!("  Title:       {}", proof.snapshot.title);
    if !proof.snapshot.tags.is_empty() {
        println!("  Tags:        {}", proof.snapshot.tags.join(", "));
    }
    println!("  Chain of custody ({} entries):", proof.custody().len());
    for (i, entry) in proof.custody().iter().enumerate() {
        println!(
            "    [{}] {} {} by {}: {}",
            i + 1,
            micros_to_datetime(entry.timestamp),
            entry.action.as_tag(),
            entry.actor,
            entry.detail
        );
    }

    Ok(())
}

fn cmd_proof_mark_verified(core: &ScoringCore, subject: &str, actor: &str) -> Result<()> {
    let proof = core
        .mark_verified(&SubjectId::new(subject), actor)
        .context("failed to mark proof verified")?;

    println!("Proof verified");
    println!("  Subject: {}", proof.subject_id);
    println!("  Status:  {}", proof.verification_status);
    Ok(())
}

fn cmd_proof_list(core: &ScoringCore) -> Result<()> {
    let subjects = core
        .recorder()
        .store()
        .list_proofs()
        .context("failed to list proofs")?;

    if subjects.is_empty() {
        println!("No proofs found.");
        return Ok(());
    }

    println!("Proofs ({}):", subjects.len());
    for subject in &subjects {
        match core.load_proof(subject) {
            Ok(proof) => println!(
                "  {}  {}  {}",
                subject,
                proof.verification_status,
                micros_to_datetime(proof.submission_timestamp)
            ),
            Err(e) => println!("  {subject}  (unreadable: {e})"),
        }
    }
    Ok(())
}

// ── Disputes ──────────────────────────────────────────────────────────────────

fn cmd_dispute_submit(
    core: &ScoringCore,
    original: &str,
    disputing: &str,
    type_str: &str,
    evidence: Vec<String>,
    reference: Option<String>,
    by: &str,
) -> Result<()> {
    let dispute_type: DisputeType = type_str.parse()?;

    let mut items: Vec<DisputeEvidence> = evidence.into_iter().map(DisputeEvidence::new).collect();
    if let (Some(reference), Some(first)) = (reference, items.first_mut()) {
        *first = first.clone().with_reference(reference);
    }

    let dispute = core
        .submit_dispute(
            &SubjectId::new(original),
            &SubjectId::new(disputing),
            dispute_type,
            items,
            &UserId::new(by),
        )
        .context("failed to submit dispute")?;

    println!("Dispute opened");
    println!("  ID:        {}", dispute.id);
    println!("  Original:  {}", dispute.original_id);
    println!("  Disputing: {}", dispute.disputing_id);
    println!("  Type:      {type_str}");
    println!("  Evidence:  {} item(s)", dispute.evidence.len());
    Ok(())
}

fn cmd_dispute_resolve(
    core: &ScoringCore,
    dispute_id: &str,
    outcome_str: &str,
    resolver: &str,
    notes: &str,
) -> Result<()> {
    let outcome: DisputeOutcome = outcome_str.parse()?;
    let dispute = core
        .resolve_dispute(&DisputeId::new(dispute_id), outcome, resolver, notes)
        .context("failed to resolve dispute")?;
    let proof = core
        .load_proof(&dispute.original_id)
        .context("failed to reload proof")?;

    println!("Dispute resolved");
    println!("  ID:           {}", dispute.id);
    println!("  Outcome:      {}", outcome.as_tag());
    println!("  Proof status: {}", proof.verification_status);
    Ok(())
}

fn cmd_dispute_list(core: &ScoringCore, subject: &str) -> Result<()> {
    let disputes = core
        .disputes_for(&SubjectId::new(subject))
        .context("failed to list disputes")?;

    if disputes.is_empty() {
        println!("No disputes found.");
        return Ok(());
    }

    println!("Disputes ({}):", disputes.len());
    for dispute in &disputes {
        let state = match &dispute.status {
            DisputeStatus::Open => "open".to_string(),
            DisputeStatus::Resolved { outcome, .. } => format!("resolved ({})", outcome.as_tag()),
        };
        println!(
            "  {}  {:?}  {}  by {}",
            dispute.id, dispute.dispute_type, state, dispute.submitted_by
        );
    }
    Ok(())
}

// ── Feeds ─────────────────────────────────────────────────────────────────────

fn print_facet(name: &str, entries: &[RecommendationScore], verbose: bool) {
    println!("{name} ({}):", entries.len());
    for entry in entries {
        println!("  {:<24} {:>8.2}", entry.item_id.to_string(), entry.score);
        if verbose {
            for reason in &entry.reasons {
                println!("      {reason}");
            }
        }
    }
}

fn cmd_recommend(
    core: &ScoringCore,
    user: &str,
    corpus_path: &Path,
    history_path: Option<&Path>,
    now: Option<u64>,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let corpus = read_corpus(Some(corpus_path))?;
    let history = read_history(history_path)?;
    let now = now.unwrap_or_else(ideamark::time::now_micros);

    let recs = core.compute_recommendations(&UserId::new(user), &corpus, &history, now);

    if json {
        return print_json(&recs);
    }

    print_facet("For you", &recs.for_you, verbose);
    print_facet("Trending", &recs.trending, verbose);
    print_facet("Similar", &recs.similar, verbose);
    print_facet("New in your categories", &recs.new_in_categories, verbose);
    Ok(())
}

fn cmd_trending(
    core: &ScoringCore,
    user: &str,
    corpus_path: &Path,
    history_path: Option<&Path>,
    now: Option<u64>,
    json: bool,
) -> Result<()> {
    let corpus = read_corpus(Some(corpus_path))?;
    let history = read_history(history_path)?;
    let now = now.unwrap_or_else(ideamark::time::now_micros);

    let ranked = core.trending(&UserId::new(user), &corpus, &history, now);

    if json {
        return print_json(&ranked);
    }
    if ranked.is_empty() {
        println!("Nothing is trending.");
        return Ok(());
    }
    print_facet("Trending", &ranked, true);
    Ok(())
}
