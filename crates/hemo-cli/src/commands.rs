use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;

use hemo_bank::{BankConfig, BankError, BloodBank};
use hemo_ledger::{
    BlockPayload, ChainVerifier, InMemoryLedger, LedgerReader, LedgerWriter,
};
use hemo_match::InMemorySink;
use hemo_types::{BloodType, DonationId, DonorId, GeoPoint, Urgency};

use crate::cli::{Cli, Command, DemoArgs, VerifyArgs};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Demo(args) => cmd_demo(args, config).await,
        Command::Verify(args) => cmd_verify(args, config),
    }
}

fn load_config(path: Option<&str>) -> anyhow::Result<BankConfig> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))
        }
        None => Ok(BankConfig {
            seed_units_per_type: 25,
            ..Default::default()
        }),
    }
}

async fn cmd_demo(args: DemoArgs, config: BankConfig) -> anyhow::Result<()> {
    let site = GeoPoint::new(12.9716, 77.5946);
    let sink = Arc::new(InMemorySink::new());
    let bank = BloodBank::new(config, Arc::clone(&sink) as _)?;
    bank.reconcile()?;

    println!("{}", "— Registering donors —".bold());
    let mut donors = Vec::new();
    for i in 0..args.donors.max(1) {
        let name = format!("donor-{}", i + 1);
        let km_out = 2.0 + 3.0 * i as f64;
        let location = GeoPoint::new(site.lat + (km_out / 6371.0f64).to_degrees(), site.lon);
        let donor = bank
            .donors()
            .register(&name, format!("{name}@hemolink.test"), BloodType::OPos, location)?;
        println!("  {} {} ({}, {:.1} km out)", "+".green(), name.bold(), donor.blood_type, km_out);
        donors.push(donor.id);
    }
    // Two donors the filter must reject: wrong type, and out of radius.
    bank.donors().register(
        "mismatch",
        "mismatch@hemolink.test",
        BloodType::AbPos,
        site,
    )?;
    bank.donors().register(
        "too-far",
        "too-far@hemolink.test",
        BloodType::OPos,
        GeoPoint::new(site.lat + (120.0 / 6371.0f64).to_degrees(), site.lon),
    )?;

    println!("\n{}", "— Creating request —".bold());
    let (request, report) = bank
        .create_request(BloodType::OPos, args.units, Urgency::Critical, site, "City General")
        .await?;
    println!(
        "  {} needs {} unit(s) of {} — {} matched, {} notified",
        request.origin.bold(),
        request.units_needed,
        request.blood_type.to_string().red().bold(),
        report.matched,
        report.notified_count().to_string().green(),
    );
    for sent in sink.sent() {
        println!("    {} {}", "->".dimmed(), sent.contact.dimmed());
    }

    println!("\n{}", "— Committing donations —".bold());
    for donor_id in donors.iter().take(args.units as usize) {
        match bank.commit_donation(*donor_id, request.id, 1) {
            Ok(donation) => println!(
                "  {} donation {} recorded in block {}",
                "✓".green().bold(),
                donation.id.short_id().yellow(),
                donation.block_index.unwrap_or_default().to_string().cyan(),
            ),
            Err(e) => println!("  {} {}", "✗".red().bold(), e),
        }
    }
    if let Some(extra) = donors.get(args.units as usize) {
        match bank.commit_donation(*extra, request.id, 1) {
            Err(BankError::RequestClosed(_)) => {
                println!("  {} late donor turned away: request already fulfilled", "✗".red())
            }
            Err(e) => println!("  {} {}", "✗".red(), e),
            Ok(_) => println!("  {} unexpected extra commit", "!".yellow()),
        }
    }

    println!("\n{}", "— Ledger —".bold());
    for block in bank.ledger_blocks()? {
        let label = match &block.payload {
            BlockPayload::Genesis => "genesis".dimmed().to_string(),
            BlockPayload::Donation { units, blood_type, .. } => {
                format!("{units} unit(s) {blood_type}")
            }
        };
        println!(
            "  #{} {} nonce={} {}",
            block.index,
            block.short_hash().yellow(),
            block.nonce,
            label
        );
    }
    let verdict = bank.verify_ledger()?;
    if verdict.is_valid() {
        println!("  integrity: {}", "✓ intact".green().bold());
    } else {
        println!(
            "  integrity: {} (first violation at block {:?})",
            "✗ violated".red().bold(),
            verdict.first_violation_index()
        );
    }

    println!("\n{}", "— Leaderboard —".bold());
    for entry in bank.leaderboard(5)? {
        println!(
            "  {}. {} — {} pts, {} donation(s)",
            entry.rank,
            entry.name.bold(),
            entry.points.to_string().cyan(),
            entry.total_donations
        );
    }

    let stats = bank.statistics()?;
    println!(
        "\n{} donors={} requests={} donations={} units_collected={}",
        "— Statistics —".bold(),
        stats.donor_count,
        stats.request_count,
        stats.donation_count,
        stats.units_collected
    );
    for stock in stats.stock {
        println!(
            "  {:>3}: {:>3} unit(s) [{:?}]",
            stock.blood_type.to_string(),
            stock.units_available,
            stock.level
        );
    }

    Ok(())
}

fn cmd_verify(args: VerifyArgs, config: BankConfig) -> anyhow::Result<()> {
    let ledger = InMemoryLedger::new(config.ledger)?;
    for i in 0..args.blocks {
        ledger.append(BlockPayload::Donation {
            donation_id: DonationId::new(),
            donor_id: DonorId::new(),
            request_id: None,
            blood_type: BloodType::OPos,
            units: i + 1,
        })?;
    }
    println!(
        "mined {} block(s) at difficulty {}",
        args.blocks,
        ledger.config().difficulty_bits
    );

    // Verification runs over a local copy so tampering never touches the
    // chain itself.
    let mut blocks = ledger.read_all()?;
    if let Some(index) = args.tamper {
        let slot = blocks
            .get_mut(index as usize)
            .with_context(|| format!("no block at index {index}"))?;
        slot.payload = BlockPayload::Donation {
            donation_id: DonationId::new(),
            donor_id: DonorId::new(),
            request_id: None,
            blood_type: BloodType::AbNeg,
            units: 999,
        };
        println!("tampered with payload at block {index}");
    }

    let report = ChainVerifier::verify_chain(&blocks)?;
    if report.is_valid() {
        println!("{} chain intact ({} blocks)", "✓".green().bold(), report.block_count);
    } else {
        println!(
            "{} {} violation(s), first at block {:?}",
            "✗".red().bold(),
            report.violations.len(),
            report.first_violation_index()
        );
        for violation in &report.violations {
            println!("  block {}: {:?} — {}", violation.index, violation.kind, violation.description);
        }
    }
    Ok(())
}
