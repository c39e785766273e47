use anyhow::Result;
use spectator_client::{Config, LineListener, MeterType, ProtocolLine, Registry, WriterConfig};
use std::time::Duration;

async fn next_lines(listener: &mut LineListener) -> Result<Vec<ProtocolLine>> {
    Ok(tokio::time::timeout(Duration::from_secs(5), listener.recv()).await??)
}

/// Registry 透過 UDP 送出，由本機 listener 接收並解析
#[tokio::test]
async fn test_meters_over_udp() -> Result<()> {
    let mut listener = LineListener::bind("udp://127.0.0.1:0").await?;
    let location = listener.local_location()?;

    let config = Config::new(WriterConfig::new(&location)?, &[("app", "checkout")]);
    if config.writer_location() != location {
        // SPECTATOR_OUTPUT_LOCATION 覆蓋了設定，這個測試沒有意義
        return Ok(());
    }
    let registry = Registry::new(config)?;

    registry.counter("server.requests", &[("status", "200")]).increment();
    let lines = next_lines(&mut listener).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].meter_type, MeterType::Counter);
    assert_eq!(lines[0].id.name(), "server.requests");
    assert_eq!(lines[0].id.tags()["app"], "checkout");
    assert_eq!(lines[0].id.tags()["status"], "200");
    assert_eq!(lines[0].value, "1.000000");

    registry
        .pct_timer("server.latency", &[])
        .record_duration(Duration::from_millis(125));
    let lines = next_lines(&mut listener).await?;
    assert_eq!(lines[0].to_string(), "T:server.latency,app=checkout:0.125000");

    registry.gauge("queue.depth", &[], Some(60)).set(12.0);
    let lines = next_lines(&mut listener).await?;
    assert_eq!(lines[0].ttl_seconds, Some(60));
    assert_eq!(lines[0].value, "12.000000");

    registry.close();
    Ok(())
}

#[tokio::test]
async fn test_buffered_udp_batches_lines() -> Result<()> {
    let mut listener = LineListener::bind("udp://127.0.0.1:0").await?;
    let location = listener.local_location()?;

    let writer_config = WriterConfig::with_buffer_size(&location, 1024)?
        .with_flush_interval(Duration::from_secs(60));
    let config = Config::new(writer_config, &[]);
    if config.writer_location() != location {
        return Ok(());
    }
    let registry = Registry::new(config)?;

    let counter = registry.counter("batched", &[]);
    for _ in 0..5 {
        counter.increment();
    }
    // 緩衝區未滿，close 時一次送出
    registry.close();

    let payload = tokio::time::timeout(Duration::from_secs(5), listener.recv_payload()).await??;
    assert_eq!(payload, "c:batched:1.000000\n".repeat(5));
    Ok(())
}

#[tokio::test]
async fn test_negative_values_are_not_sent() -> Result<()> {
    let mut listener = LineListener::bind("udp://127.0.0.1:0").await?;
    let location = listener.local_location()?;

    let config = Config::new(WriterConfig::new(&location)?, &[]);
    if config.writer_location() != location {
        return Ok(());
    }
    let registry = Registry::new(config)?;

    registry.timer("t", &[]).record(-1.0);
    registry.distribution_summary("d", &[]).record(-5);
    registry.counter("c", &[]).add(-2.0);
    registry.max_gauge("sentinel", &[]).set(1.0);

    // 第一個收到的就是 sentinel，代表前面的都沒送出
    let lines = next_lines(&mut listener).await?;
    assert_eq!(lines[0].to_string(), "m:sentinel:1.000000");
    Ok(())
}
