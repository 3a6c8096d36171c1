use crate::brief::Brief;
use crate::forecast::{ChainReport, ForecastOutcome};
use crate::presenter::Presenter;
use crate::session::SessionStatus;

const RULE: &str = "============================================================";

pub struct TerminalPresenter;

impl Presenter for TerminalPresenter {
    fn session(&self, status: &SessionStatus) {
        println!("{}", render_session(status));
    }

    fn brief(&self, brief: &Brief) {
        println!("{brief}");
    }

    fn forecast(&self, symbol: &str, report: &ChainReport) {
        if let ForecastOutcome::Answered { provider, .. } = &report.outcome {
            tracing::info!(symbol, provider, "forecast ready");
        }
        println!("{}", render_forecast(symbol, report));
    }
}

fn render_session(status: &SessionStatus) -> String {
    let mut out = format!("{RULE}\nBORSA İSTANBUL (BIST) DURUM BİLGİSİ\n{RULE}\n");
    if status.is_open {
        out.push_str(&status.reason);
    } else {
        out.push_str(&format!(
            "{}\nUYARI: Borsa kapalı olduğu için veriler güncel olmayabilir.",
            status.reason
        ));
    }
    out.push_str(&format!("\n{RULE}"));
    out
}

fn render_forecast(symbol: &str, report: &ChainReport) -> String {
    let mut out = format!("{RULE}\n{symbol} TEKNİK ANALİZ SONUÇLARI\n{RULE}\n");
    for diagnostic in &report.diagnostics {
        out.push_str(&format!(
            "[{}] başarısız: {}\n",
            diagnostic.provider, diagnostic.failure
        ));
    }
    match &report.outcome {
        ForecastOutcome::Answered { provider, text } => {
            out.push_str(&format!("Kaynak: {provider}\n\n{}\n", text.trim()));
        }
        ForecastOutcome::NoForecast => {
            out.push_str(
                "HATA: Hiçbir yapay zekâ servisinden yanıt alınamadı.\n\
Lütfen API anahtarlarınızı ve internet bağlantınızı kontrol edin.\n",
            );
        }
    }
    out.push_str("\nBu çıktı yatırım tavsiyesi değildir; kendi riskinizi değerlendirin.");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{FailureKind, ProviderDiagnostic};

    #[test]
    fn answered_forecast_lists_earlier_failures() {
        let report = ChainReport {
            outcome: ForecastOutcome::Answered {
                provider: "xai",
                text: "  Beklenen Yön: Yatay\n".into(),
            },
            diagnostics: vec![ProviderDiagnostic {
                provider: "gemini",
                failure: FailureKind::BadStatus(429),
            }],
        };
        let out = render_forecast("THYAO", &report);
        assert!(out.contains("THYAO TEKNİK ANALİZ SONUÇLARI"));
        assert!(out.contains("[gemini] başarısız: bad status 429"));
        assert!(out.contains("Kaynak: xai\n\nBeklenen Yön: Yatay\n"));
    }

    #[test]
    fn no_forecast_is_explicit() {
        let report = ChainReport {
            outcome: ForecastOutcome::NoForecast,
            diagnostics: ["gemini", "xai", "groq"]
                .into_iter()
                .map(|provider| ProviderDiagnostic {
                    provider,
                    failure: FailureKind::MissingCredential,
                })
                .collect(),
        };
        let out = render_forecast("AKBNK", &report);
        assert_eq!(out.matches("missing credential").count(), 3);
        assert!(out.contains("HATA"));
    }

    #[test]
    fn closed_session_warns() {
        let status = SessionStatus {
            is_open: false,
            reason: "Hafta sonu - BIST kapalı (Bugün: Pazar)".into(),
        };
        let out = render_session(&status);
        assert!(out.contains("Pazar"));
        assert!(out.contains("UYARI"));
    }

    #[test]
    fn terminal_presenter_does_not_panic() {
        let status = SessionStatus {
            is_open: true,
            reason: "BIST açık".into(),
        };
        TerminalPresenter.session(&status);
        TerminalPresenter.forecast(
            "GARAN",
            &ChainReport {
                outcome: ForecastOutcome::NoForecast,
                diagnostics: vec![],
            },
        );
    }
}
