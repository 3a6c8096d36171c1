//! Renders the latest enriched record into the Turkish text brief sent to
//! the forecast providers.
//!
//! The output is a pure function of the enriched series: the same input
//! always produces byte-identical text.

use std::fmt;

use error_stack::{Report, bail};

use crate::error::BriefError;
use crate::indicator::Column;
use crate::indicator::bollinger::BandPosition;
use crate::indicator::pipeline::{EnrichedRecord, EnrichedSeries};
use crate::model::Bar;

/// Rendered in place of any value that could not be computed.
pub const PLACEHOLDER: &str = "Hesaplanamadı";

/// About three trading days of 15-minute bars.
const RANGE_WINDOW: usize = 48;
/// About one trading day.
const DAY_WINDOW: usize = 32;
/// About one week.
const WEEK_WINDOW: usize = 224;

/// A fully rendered brief for one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief {
    symbol: String,
    text: String,
}

impl Brief {
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Brief {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Fixed-precision rendering; absent or non-finite values become [`PLACEHOLDER`].
pub fn fmt_value(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => PLACEHOLDER.to_owned(),
    }
}

fn price(value: Option<f64>) -> String {
    fmt_value(value, 2)
}

fn count(value: Option<f64>) -> String {
    fmt_value(value, 0)
}

/// Direction implied by the MACD line relative to its signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdBias {
    Bullish,
    Bearish,
    Neutral,
}

impl MacdBias {
    pub fn classify(macd: Option<f64>, signal: Option<f64>) -> Self {
        match (macd, signal) {
            (Some(m), Some(s)) if m > s => Self::Bullish,
            (Some(m), Some(s)) if m < s => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bullish => "YÜKSELİŞ SİNYALİ",
            Self::Bearish => "DÜŞÜŞ SİNYALİ",
            Self::Neutral => "NÖTR",
        }
    }
}

pub fn band_label(position: BandPosition) -> &'static str {
    match position {
        BandPosition::Above => "ÜSTTE (AŞIRI ALIM)",
        BandPosition::Within => "NORMAL",
        BandPosition::Below => "ALTTA (AŞIRI SATIM)",
    }
}

fn highest(bars: &[Bar]) -> Option<f64> {
    bars.iter()
        .filter(|b| b.is_usable())
        .map(|b| b.high)
        .reduce(f64::max)
}

fn lowest(bars: &[Bar]) -> Option<f64> {
    bars.iter()
        .filter(|b| b.is_usable())
        .map(|b| b.low)
        .reduce(f64::min)
}

/// Aggregates over the trailing windows, computed once per brief.
struct Windows {
    day_open: Option<f64>,
    day_high: Option<f64>,
    day_low: Option<f64>,
    week_high: Option<f64>,
    week_low: Option<f64>,
    range_high: Option<f64>,
    range_low: Option<f64>,
}

impl Windows {
    fn from_series(enriched: &EnrichedSeries) -> Self {
        let series = enriched.series();
        let day = series.tail(DAY_WINDOW);
        let week = series.tail(WEEK_WINDOW);
        let range = series.tail(RANGE_WINDOW);
        Self {
            day_open: day.first().filter(|b| b.is_usable()).map(|b| b.open),
            day_high: highest(day),
            day_low: lowest(day),
            week_high: highest(week),
            week_low: lowest(week),
            range_high: highest(range),
            range_low: lowest(range),
        }
    }
}

/// Compile the brief for the latest record of `enriched`.
pub fn compile(enriched: &EnrichedSeries) -> Result<Brief, Report<BriefError>> {
    let record = enriched.latest();
    if !record.bar.is_usable() {
        bail!(BriefError::UnusableLatestRecord {
            timestamp: record.bar.timestamp.to_rfc3339(),
        });
    }
    let symbol = enriched.series().symbol();
    let windows = Windows::from_series(enriched);

    let sections = [
        instructions(symbol),
        headline(&record, &windows),
        momentum(&record),
        trend(&record),
        moving_averages(&record),
        volatility(&record),
        volume(&record),
        support_resistance(&record),
        ichimoku(&record),
        derived(&record),
        GLOSSARY.to_owned(),
        template(symbol),
    ];

    Ok(Brief {
        symbol: symbol.to_owned(),
        text: sections.join("\n\n"),
    })
}

fn instructions(symbol: &str) -> String {
    format!(
        "Sen deneyimli bir Borsa İstanbul teknik analistisin. Aşağıda {symbol} hissesi için \
15 dakikalık mumlardan hesaplanmış teknik göstergeler yer alıyor. Göstergeleri birlikte \
değerlendir, birbirini doğrulayan ve çelişen sinyalleri tart ve yalnızca verilerin \
desteklediği ölçüde net bir görüş bildir.
Sinyaller zayıf veya çelişkiliyse \"Yatay\", \"Alma\" ya da \"Satma\" de; güçlü ve tutarlı \
sinyallerde \"Güçlü Al\" veya \"Güçlü Sat\" ifadelerini kullanmaktan çekinme."
    )
}

fn headline(r: &EnrichedRecord<'_>, w: &Windows) -> String {
    format!(
        "=TEMEL VERİLER=
Son Fiyat: {} TL
Günün Açılışı: {} TL
Günün En Yüksek: {} TL
Günün En Düşük: {} TL
Haftalık En Yüksek: {} TL
Haftalık En Düşük: {} TL
Son 48 Periyot Aralığı: {} TL – {} TL
Son Hacim: {}
Saatlik Fiyat Değişimi: %{}
Günlük Fiyat Değişimi: %{}",
        price(Some(r.bar.close)),
        price(w.day_open),
        price(w.day_high),
        price(w.day_low),
        price(w.week_high),
        price(w.week_low),
        price(w.range_low),
        price(w.range_high),
        // whole shares, truncated
        count(Some(r.bar.volume.trunc())),
        price(r.get(Column::PriceChange1h)),
        price(r.get(Column::PriceChange1d)),
    )
}

fn momentum(r: &EnrichedRecord<'_>) -> String {
    format!(
        "=MOMENTUM GÖSTERGELERİ=
RSI(14): {} [30 altı aşırı satım, 70 üstü aşırı alım]
RSI(6) Kısa: {} [25 altı aşırı satım, 75 üstü aşırı alım; kısa vadeli dönüşleri erken gösterir]
Williams %R: {} [-80 altı aşırı satım, -20 üstü aşırı alım]
Stoch K: {} | D: {} [20 altı aşırı satım, 80 üstü aşırı alım]",
        price(r.get(Column::Rsi14)),
        price(r.get(Column::Rsi6)),
        price(r.get(Column::WilliamsR)),
        price(r.get(Column::StochK)),
        price(r.get(Column::StochD)),
    )
}

fn trend(r: &EnrichedRecord<'_>) -> String {
    let bias = MacdBias::classify(r.get(Column::Macd), r.get(Column::MacdSignal));
    format!(
        "=TREND GÖSTERGELERİ=
MACD: {} | Sinyal: {} [{}]
MACD Histogram: {} [pozitif yükseliş, negatif düşüş momentumu]
ADX: {} [25 üstü güçlü, 50 üstü çok güçlü trend; yönden bağımsızdır]
ADX +DI: {} | -DI: {} [+DI > -DI yükseliş, tersi düşüş trendi]
CCI: {} [100 üstü aşırı alım, -100 altı aşırı satım]",
        price(r.get(Column::Macd)),
        price(r.get(Column::MacdSignal)),
        bias.label(),
        price(r.get(Column::MacdHistogram)),
        price(r.get(Column::Adx)),
        price(r.get(Column::AdxPos)),
        price(r.get(Column::AdxNeg)),
        price(r.get(Column::Cci)),
    )
}

fn moving_averages(r: &EnrichedRecord<'_>) -> String {
    let rows = [
        (Column::Sma5, Column::Ema5, 5, "Çok kısa vadeli trend"),
        (Column::Sma10, Column::Ema10, 10, "Kısa vadeli trend"),
        (Column::Sma20, Column::Ema20, 20, "Orta vadeli trend"),
        (Column::Sma50, Column::Ema50, 50, "Uzun vadeli trend"),
    ];
    let mut lines = vec!["=HAREKETLİ ORTALAMALAR=".to_owned()];
    for (sma, ema, period, hint) in rows {
        lines.push(format!(
            "SMA({period}): {} | EMA({period}): {} [{hint}]",
            price(r.get(sma)),
            price(r.get(ema)),
        ));
    }
    lines.push(
        "Fiyat tüm ortalamaların üstündeyse güçlü yükseliş, altındaysa güçlü düşüş eğilimi vardır."
            .to_owned(),
    );
    lines.join("\n")
}

fn volatility(r: &EnrichedRecord<'_>) -> String {
    let position = BandPosition::classify(
        r.bar.close,
        r.get(Column::BbUpper),
        r.get(Column::BbLower),
    );
    format!(
        "=VOLATİLİTE GÖSTERGELERİ=
Bollinger Üst: {} | Orta: {} | Alt: {} | Pozisyon: {} [bant daralması sıkışmaya, genişlemesi yüksek oynaklığa işaret eder]
BB Genişlik: %{}
ATR: {} [ortalama gerçek aralık; yüksek değer büyük hareket potansiyeli demektir]
Keltner Üst: {} | Alt: {} [üst bandın aşılması güçlü yükseliş, alt bandın aşılması güçlü düşüş]",
        price(r.get(Column::BbUpper)),
        price(r.get(Column::BbMiddle)),
        price(r.get(Column::BbLower)),
        band_label(position),
        price(r.get(Column::BbWidth)),
        price(r.get(Column::Atr)),
        price(r.get(Column::KcUpper)),
        price(r.get(Column::KcLower)),
    )
}

fn volume(r: &EnrichedRecord<'_>) -> String {
    format!(
        "=HACİM ANALİZİ=
VWAP: {} TL [fiyat VWAP üstündeyse alıcılar, altındaysa satıcılar baskın]
Tipik Fiyat: {} TL
Hacim Ortalaması: {}
OBV: {} [yükselen OBV alım baskısını gösterir]
CMF: {} [0.1 üstü güçlü para girişi, -0.1 altı para çıkışı]
Hacim Değişimi: %{}",
        price(r.get(Column::Vwap)),
        price(r.get(Column::TypicalPrice)),
        count(r.get(Column::VolumeSma)),
        count(r.get(Column::Obv)),
        price(r.get(Column::Cmf)),
        price(r.get(Column::VolumeChange)),
    )
}

fn support_resistance(r: &EnrichedRecord<'_>) -> String {
    let resistance = r.get(Column::Resistance);
    let support = r.get(Column::Support);
    let spread = match (resistance, support) {
        (Some(res), Some(sup)) => Some((res - sup) / r.bar.close * 100.0),
        _ => None,
    };
    format!(
        "=DESTEK/DİRENÇ SEVİYELERİ=
Direnç Seviyesi: {} TL [kırılırsa yükseliş hızlanabilir]
Destek Seviyesi: {} TL [kırılırsa düşüş hızlanabilir]
Destek-Direnç Aralığı: %{} [geniş aralık yüksek oynaklık, dar aralık sıkışma]",
        price(resistance),
        price(support),
        price(spread),
    )
}

fn ichimoku(r: &EnrichedRecord<'_>) -> String {
    format!(
        "=ICHIMOKU BULUTU=
Ichimoku A: {} | B: {} [fiyat bulutun üstündeyse yükseliş, altındaysa düşüş trendi]
Tenkan: {} | Kijun: {} [Tenkan Kijun'u yukarı keserse al, aşağı keserse sat sinyali]",
        price(r.get(Column::IchimokuA)),
        price(r.get(Column::IchimokuB)),
        price(r.get(Column::IchimokuConversion)),
        price(r.get(Column::IchimokuBase)),
    )
}

fn derived(r: &EnrichedRecord<'_>) -> String {
    format!(
        "=ÖZEL HESAPLAMALAR=
Fiyat Değişimi 1 Saat: %{} [kısa vadeli momentum]
Fiyat Değişimi 1 Gün: %{} [orta vadeli momentum]
Hacim Değişimi 1 Saat: %{} [alım/satım baskısı]
Direnç: {} TL [son 48 periyodun en yüksek fiyatı]
Destek: {} TL [son 48 periyodun en düşük fiyatı]",
        price(r.get(Column::PriceChange1h)),
        price(r.get(Column::PriceChange1d)),
        price(r.get(Column::VolumeChange)),
        price(r.get(Column::Resistance)),
        price(r.get(Column::Support)),
    )
}

const GLOSSARY: &str = "TERİMLERİN AÇIKLAMASI:
- Volatilite: Fiyatın kısa sürede ne kadar oynadığı. Yüksek volatilite büyük fiyat hareketleri demektir.
- Momentum: Fiyatın yükselme veya düşme hızı; trendin sürüp sürmeyeceğine dair ipucu verir.
- RSI: 0-100 arasında salınan osilatör. 70 üzeri aşırı alım, 30 altı aşırı satım.
- MACD: Trendin yönünü ve momentumunu gösterir. MACD sinyalin üstündeyse yükseliş eğilimi vardır.
- ADX: Trendin gücünü ölçer; 25 üzeri güçlü, 50 üzeri çok güçlü trend.
- Bollinger Bandı: Standart sapmaya göre çizilen bantlar; bant dışı hareketler aşırı alım/satım işaretidir.
- Keltner Kanalı: Bollinger'a benzer, daha yumuşak bir oynaklık kanalı.
- VWAP: Hacim ağırlıklı ortalama fiyat.
- OBV: Hacmi fiyat yönüyle birleştirir; yükseliyorsa alım baskısı artıyordur.
- CMF: Piyasaya para giriş ve çıkışını ölçer.
- Ichimoku Bulutu: Fiyat bulutun üstündeyse yükseliş, altındaysa düşüş trendi güçlüdür.
- Destek: Alıcıların güçlü olduğu, fiyatın aşağıda tutunduğu seviye.
- Direnç: Satıcıların güçlü olduğu, fiyatın yukarıda zorlandığı seviye.
- SMA/EMA: Fiyat ortalamaları; EMA son fiyatlara daha hızlı tepki verir.
- Stochastic: Kapanışın son aralıktaki konumu; 20 altı aşırı satım, 80 üstü aşırı alım.";

fn template(symbol: &str) -> String {
    format!(
        "Bu verilere dayanarak aşağıdaki şablonu doldur:

**{symbol} HİSSE ANALİZİ**

---GÜNCEL FİYAT (15dk gecikmeli): ___ TL---

**1 SAAT İÇİN:
- Beklenen Yön: ___ (Yükseliş/Düşüş/Yatay)
- Alınır mı: ___ (Güçlü Al/Al/Alma)
- Satılır mı: ___ (Güçlü Sat/Sat/Satma)
- Olası Fiyat Aralığı: ___ TL – ___ TL
- 1 Saatlik Tahmin: ___ TL

**1-5 SAAT İÇİN (Gün içi swing):
- Beklenen Yön: ___ (Yükseliş/Düşüş/Yatay)
- Alınır mı: ___ (Güçlü Al/Al/Alma)
- Satılır mı: ___ (Güçlü Sat/Sat/Satma)
- Olası Fiyat Aralığı: ___ TL – ___ TL
- 5 Saatlik Tahmin: ___ TL

**GÜNLÜK (Kapanışa kadar 18:00):
- Beklenen Yön: ___ (Yükseliş/Düşüş/Yatay)
- Alınır mı: ___ (Güçlü Al/Al/Alma)
- Satılır mı: ___ (Güçlü Sat/Sat/Satma)
- Gün İçi En Düşük: ___ TL
- Gün İçi Tahmin: ___ TL
- Gün İçi En Yüksek: ___ TL
- İdeal Alış Saati: __:__ (SS:DD)
- İdeal Satış Saati: __:__ (SS:DD)

**HAFTALIK (Bu hafta toplam):
- Beklenen Yön: ___ (Yükseliş/Düşüş/Yatay)
- Alınır mı: ___ (Güçlü Al/Al/Alma)
- Satılır mı: ___ (Güçlü Sat/Sat/Satma)
- Hafta En Düşük: ___ TL
- Hafta Tahmin: ___ TL
- Hafta En Yüksek: ___ TL

Yalnızca boşlukları doldur, ek açıklama yazma."
    )
}
