use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use ume_loans::api::mock::{MockConfig, mock_routes};
use ume_loans::api::{HttpApiClient, LeadApi};
use ume_loans::config::WizardConfig;
use ume_loans::form::model::{
    LoanFormPatch, LoanPurpose, LoanType, MAX_LOAN_AMOUNT, MIN_LOAN_AMOUNT, Personality,
    QUICK_AMOUNTS,
};
use ume_loans::form::state::WizardStep;
use ume_loans::form::validate::{ContactValidator, format_phone_display, normalize_phone};
use ume_loans::session::FileSessionStore;
use ume_loans::wizard::Wizard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let config = WizardConfig::from_env();

    eprintln!("💰 Ume Loans v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Fast, Simple, Secure Loan Applications");
    eprintln!("   API: {}", config.api_base);
    eprintln!("   Session: {}", config.session_path.display());

    // Demo mode: serve the mocked backend in-process.
    if config.demo_mode {
        let app = mock_routes(MockConfig::default());
        let listener =
            tokio::net::TcpListener::bind(format!("127.0.0.1:{}", config.mock_port)).await?;
        eprintln!("   Demo backend: http://127.0.0.1:{}/api", config.mock_port);
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
    }
    eprintln!();

    let store = Arc::new(FileSessionStore::with_ttl(
        config.session_path.clone(),
        config.session_ttl,
    ));
    let api: Arc<dyn LeadApi> = Arc::new(HttpApiClient::new(config.api_base.clone()));
    let mut wizard = Wizard::new(store, api);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    // Welcome back?
    if let Some(prompt) = wizard.check_saved_session() {
        eprintln!("👋 Welcome back! We found a saved application from your previous visit.");
        eprintln!("   Progress: step {} of 3", prompt.step.index());
        if let Some(name) = &prompt.name {
            eprintln!("   Name: {name}");
        }
        eprintln!("   Loan amount: {}", format_currency(prompt.loan_amount));
        if ask_yes_no(&mut lines, "Continue this application?").await? {
            wizard.restore_session();
        } else {
            wizard.start_fresh();
        }
        eprintln!();
    }

    let validator = ContactValidator::new();

    loop {
        match wizard.state().current_step() {
            WizardStep::Quiz => run_quiz_step(&mut wizard, &mut lines).await?,
            WizardStep::LoanDetails => run_loan_details_step(&mut wizard, &mut lines).await?,
            WizardStep::Contact => {
                run_contact_step(&mut wizard, &mut lines, &validator).await?;
            }
            WizardStep::Completed => {
                print_success(&wizard);
                if ask_yes_no(&mut lines, "Start a new application?").await? {
                    wizard.clear_all_data();
                } else {
                    break;
                }
            }
        }
    }

    eprintln!("Thanks for visiting Ume Loans!");
    Ok(())
}

type InputLines = Lines<BufReader<Stdin>>;

/// Read one trimmed line; EOF is an error (the wizard needs an answer).
async fn read_line(lines: &mut InputLines) -> anyhow::Result<String> {
    match lines.next_line().await? {
        Some(line) => Ok(line.trim().to_string()),
        None => anyhow::bail!("input closed"),
    }
}

async fn ask_yes_no(lines: &mut InputLines, question: &str) -> anyhow::Result<bool> {
    loop {
        eprint!("{question} [y/n] ");
        match read_line(lines).await?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => eprintln!("Please answer y or n."),
        }
    }
}

/// Present numbered options, return the chosen index.
async fn ask_choice(
    lines: &mut InputLines,
    title: &str,
    options: &[(&str, &str)],
) -> anyhow::Result<usize> {
    eprintln!("{title}");
    for (i, (label, description)) in options.iter().enumerate() {
        eprintln!("  {}. {label} — {description}", i + 1);
    }
    loop {
        eprint!("> ");
        let answer = read_line(lines).await?;
        if let Ok(n) = answer.parse::<usize>() {
            if (1..=options.len()).contains(&n) {
                return Ok(n - 1);
            }
        }
        eprintln!("Enter a number between 1 and {}.", options.len());
    }
}

async fn run_quiz_step(wizard: &mut Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    let personality = match ask_choice(
        lines,
        "What's your financial personality?",
        &[
            ("The Planner", "I budget everything down to the cent"),
            ("The Balancer", "I save some, I spend some"),
            ("The Dreamer", "Money is for making memories"),
        ],
    )
    .await?
    {
        0 => Personality::Planner,
        1 => Personality::Balanced,
        _ => Personality::Dreamer,
    };
    wizard.update_form(LoanFormPatch {
        personality: Some(personality),
        ..LoanFormPatch::default()
    });

    let purpose = match ask_choice(
        lines,
        "When do you need the funds?",
        &[
            ("Right away", "I have an immediate need"),
            ("Within a few months", "Planning a near-term purchase"),
            ("Just planning ahead", "Just exploring options"),
        ],
    )
    .await?
    {
        0 => LoanPurpose::Immediate,
        1 => LoanPurpose::ShortTerm,
        _ => LoanPurpose::Planning,
    };
    wizard.update_form(LoanFormPatch {
        loan_purpose: Some(purpose),
        ..LoanFormPatch::default()
    });

    wizard.advance();
    Ok(())
}

async fn run_loan_details_step(wizard: &mut Wizard, lines: &mut InputLines) -> anyhow::Result<()> {
    eprintln!("How much would you like to borrow?");
    let quick = QUICK_AMOUNTS
        .iter()
        .map(|a| format_currency(*a))
        .collect::<Vec<_>>()
        .join(", ");
    eprintln!(
        "  Quick picks: {quick} — or any amount from {} to {}",
        format_currency(MIN_LOAN_AMOUNT),
        format_currency(MAX_LOAN_AMOUNT)
    );

    let amount = loop {
        eprint!("Amount (or 'back'): ");
        let answer = read_line(lines).await?;
        if answer.eq_ignore_ascii_case("back") {
            wizard.go_back();
            return Ok(());
        }
        let digits: String = answer.chars().filter(|c| c.is_ascii_digit()).collect();
        match digits.parse::<u32>() {
            Ok(n) => break n,
            Err(_) => eprintln!("Enter a dollar amount."),
        }
    };

    let loan_type = match ask_choice(
        lines,
        "What kind of loan?",
        &[
            ("Personal Loan", "For life's big moments"),
            ("Auto Loan", "New wheels"),
            ("Home Loan", "A place of your own"),
            ("Business Loan", "Grow the dream"),
        ],
    )
    .await?
    {
        0 => LoanType::Personal,
        1 => LoanType::Auto,
        2 => LoanType::Home,
        _ => LoanType::Business,
    };

    wizard.update_form(LoanFormPatch {
        loan_amount: Some(amount),
        loan_type: Some(loan_type),
        ..LoanFormPatch::default()
    });
    let stored = wizard.state().form_data().loan_amount;
    eprintln!(
        "Requesting {} as a {}.",
        format_currency(stored),
        loan_type.label()
    );

    wizard.advance();
    Ok(())
}

async fn run_contact_step(
    wizard: &mut Wizard,
    lines: &mut InputLines,
    validator: &ContactValidator,
) -> anyhow::Result<()> {
    eprintln!("Almost there! We just need a few details.");

    let name = loop {
        eprint!("Full name (or 'back'): ");
        let answer = read_line(lines).await?;
        if answer.eq_ignore_ascii_case("back") {
            wizard.go_back();
            return Ok(());
        }
        match validator.validate_name(&answer) {
            Ok(()) => break answer,
            Err(e) => eprintln!("  ✗ {e}"),
        }
    };

    let email = loop {
        eprint!("Email: ");
        let answer = read_line(lines).await?;
        match validator.validate_email(&answer) {
            Ok(()) => break answer,
            Err(e) => eprintln!("  ✗ {e}"),
        }
    };

    let phone = loop {
        eprint!("Phone (10 digits): ");
        let answer = normalize_phone(&read_line(lines).await?);
        match validator.validate_phone(&answer) {
            Ok(()) => {
                eprintln!("  {}", format_phone_display(&answer));
                break answer;
            }
            Err(e) => eprintln!("  ✗ {e}"),
        }
    };

    wizard.update_form(LoanFormPatch::contact(name, email, phone));

    if !ask_yes_no(lines, "Do you agree to the terms and conditions?").await? {
        eprintln!("We can't submit without your agreement.");
        return Ok(());
    }
    wizard.set_agreed_to_terms(true);

    loop {
        eprintln!("Submitting your application...");
        if wizard.submit().await {
            return Ok(());
        }
        let message = wizard
            .state()
            .submission()
            .error
            .clone()
            .unwrap_or_else(|| "Submission failed".to_string());
        eprintln!("  ✗ {message}");
        if !ask_yes_no(lines, "Try again?").await? {
            return Ok(());
        }
    }
}

fn print_success(wizard: &Wizard) {
    let data = wizard.state().form_data();
    eprintln!();
    eprintln!("🎉 Application submitted!");
    eprintln!(
        "   {} for {}",
        data.loan_type.label(),
        format_currency(data.loan_amount)
    );
    if let Some(lead_id) = &data.lead_id {
        eprintln!("   Lead ID:      {lead_id}");
    }
    if let Some(account_id) = &data.account_id {
        eprintln!("   Account ID:   {account_id}");
    }
    if let Some(salesforce_id) = &data.salesforce_id {
        eprintln!("   Reference:    {salesforce_id}");
    }
    eprintln!("   You'll receive an email with next steps within 24-48 hours.");
    eprintln!();
}

/// "$50,000" style display formatting.
fn format_currency(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}
